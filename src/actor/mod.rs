//! Actor Model: Message-passing driver for the reveal buffer.
//!
//! The reveal buffer is a plain state machine. This module gives it a
//! home thread and a clock:
//! - **Producers** send chunks (and resets) through a [`PacerHandle`]
//! - **Pacer Actor** owns the buffer and fires its ticks on time
//! - **Consumer** receives [`DisplayUpdate`]s and renders them
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   RevealCommand   ┌──────────────┐   DisplayUpdate   ┌──────────────┐
//! │   Producer   │ ────────────────▶ │ Pacer Thread │ ────────────────▶ │   Consumer   │
//! │ (responder)  │                   │ RevealBuffer │                   │  (printer)   │
//! └──────────────┘                   └──────────────┘                   └──────────────┘
//!                                           ▲
//!                                           │ deadline (one armed tick)
//! ```

mod messages;
mod pacer;

pub use messages::{DisplayUpdate, RevealCommand};
pub use pacer::{EpochSink, PacerActor, PacerHandle};
