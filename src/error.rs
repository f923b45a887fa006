//! Error type shared by the library.

use std::io;
use std::path::PathBuf;

/// Errors produced by trickle.
///
/// A failing backend is deliberately *not* a stream state: producers turn
/// [`Error::Responder`] into ordinary text and feed it through the reveal
/// pipeline like any other chunk.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O operation failed (terminal, child process, thread spawn).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A configuration file could not be parsed.
    #[error("failed to parse config {}: {source}", .path.display())]
    Config {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The backend failed to answer a prompt.
    #[error("{0}")]
    Responder(String),

    /// The stream a producer was feeding has been reset by a newer one.
    #[error("stream superseded by a newer prompt")]
    Superseded,

    /// The pacer actor is no longer running.
    #[error("pacer actor disconnected")]
    Disconnected,
}

/// Convenience alias for results carrying [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
