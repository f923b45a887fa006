//! # Trickle
//!
//! Paced, cancellable reveal of streamed LLM text.
//!
//! A backend may answer with one large burst or with many small fragments.
//! Trickle queues whatever arrives and releases it to the display at a
//! steady rate, so the reader sees a uniform reveal regardless of how the
//! text was delivered.
//!
//! ## Core Concepts
//!
//! - **Reveal buffer**: pending units, displayed text, one outstanding tick
//! - **Epochs**: every reset starts a new stream; stale ticks are no-ops
//! - **Pacer actor**: a dedicated thread that owns the buffer and its timer
//! - **Producers**: responders and delivery strategies feeding the buffer
//! - **Session**: the prompt loop, one stream per prompt
//!
//! ## Example
//!
//! ```rust,ignore
//! use trickle::{PacerActor, RevealConfig};
//!
//! let pacer = PacerActor::spawn(RevealConfig::default())?;
//! let handle = pacer.handle();
//! handle.append("Hello, ")?;
//! handle.append("world!")?;
//!
//! for update in pacer.updates() {
//!     // render update
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod config;
pub mod error;
pub mod producer;
pub mod reveal;
pub mod session;
pub mod terminal;

// Re-exports for convenience
pub use actor::{DisplayUpdate, EpochSink, PacerActor, PacerHandle};
pub use config::{Config, ProducerConfig, RevealConfig};
pub use error::{Error, Result};
pub use producer::{run_prompt, CannedResponder, ChunkSink, CommandResponder, Delivery, Responder};
pub use reveal::{
    AppendOptions, DisplayProjection, Epoch, RevealBuffer, StreamState, TickOutcome, TickToken,
    UnitMode,
};
pub use session::Session;
pub use terminal::RevealPrinter;
