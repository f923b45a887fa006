//! Message types for pacer communication.
//!
//! These enums define the protocol between producers, the pacer thread
//! and the consumer that renders the display.

use crate::reveal::{Epoch, StreamState};
use crossbeam_channel::Sender;

/// Commands sent to the pacer thread.
#[derive(Debug)]
pub enum RevealCommand {
    /// Queue text for reveal.
    Append {
        /// The text content.
        chunk: String,
        /// Stream this chunk belongs to. Chunks tagged with an epoch other
        /// than the current one are dropped; `None` always appends.
        epoch: Option<Epoch>,
    },

    /// Cancel the outstanding tick and start a new stream.
    Reset {
        /// Receives the new epoch once the reset has taken effect.
        ack: Sender<Epoch>,
    },

    /// Report whether a tick is outstanding. Answered after every command
    /// sent before it, so it reflects all earlier appends.
    Status {
        /// Receives the stream state.
        ack: Sender<StreamState>,
    },

    /// Stop the pacer thread.
    Shutdown,
}

/// Changes to the display, published by the pacer thread.
///
/// Applying these in order to a [`DisplayProjection`](crate::reveal::DisplayProjection)
/// reproduces the pacer's own projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayUpdate {
    /// Units were revealed.
    Revealed {
        /// Stream the text belongs to.
        epoch: Epoch,
        /// Number of units in `text`.
        units: usize,
        /// The newly revealed text (a delta, not the whole display).
        text: String,
    },

    /// The display was cleared and a new stream began.
    Reset {
        /// The new stream.
        epoch: Epoch,
    },

    /// Everything appended so far has been revealed.
    Idle {
        /// Stream that went idle.
        epoch: Epoch,
    },
}

impl DisplayUpdate {
    /// Stream the update belongs to.
    pub const fn epoch(&self) -> Epoch {
        match self {
            Self::Revealed { epoch, .. } | Self::Reset { epoch } | Self::Idle { epoch } => *epoch,
        }
    }
}
