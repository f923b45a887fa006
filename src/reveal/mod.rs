//! Incremental reveal: decouple how text arrives from how it is shown.
//!
//! A producer may hand over a whole response at once or dribble it in as
//! many fragments. Either way the [`RevealBuffer`] queues the text as
//! units and releases at most `batch_size` of them per tick, so the display
//! grows at a steady, readable pace.
//!
//! # Example
//!
//! ```rust
//! use trickle::reveal::RevealBuffer;
//!
//! let mut buffer = RevealBuffer::default();
//! buffer.append("Hello, ");
//! buffer.append("world!");
//!
//! // A real driver waits `token.delay()` before each tick.
//! while let Some(token) = buffer.outstanding() {
//!     let _ = buffer.tick(token);
//! }
//! assert_eq!(buffer.displayed().as_str(), "Hello, world!");
//! ```

mod buffer;
mod projection;
mod unit;

pub use buffer::{
    AppendOptions, Epoch, RevealBuffer, RevealStats, StreamState, TickOutcome, TickToken,
    TimerChange,
};
pub use projection::DisplayProjection;
pub use unit::UnitMode;
