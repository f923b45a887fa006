//! Reveal buffer: chunk accumulator, pacing scheduler and reset control.
//!
//! The buffer is a pure state machine. It never sleeps and never owns a
//! clock; instead every operation that needs a timer hands back a
//! [`TickToken`] and the driver (the pacer actor, or a test) is expected
//! to call [`RevealBuffer::tick`] with that token once `token.delay()` has
//! elapsed.
//!
//! # State machine
//!
//! ```text
//!            append (non-empty)             tick (units remain)
//!   ┌──────┐ ─────────────────▶ ┌───────────┐ ◀──────┐
//!   │ Idle │                    │ Streaming │ ───────┘
//!   └──────┘ ◀───────────────── └───────────┘
//!      ▲      tick (last units)       │
//!      └────────── reset ─────────────┘   (new epoch)
//! ```
//!
//! At most one token is outstanding at a time. A token whose epoch or
//! sequence number no longer matches the outstanding one is stale and
//! [`RevealBuffer::tick`] ignores it.

use super::projection::DisplayProjection;
use crate::config::RevealConfig;
use crate::error::Result;
use crate::producer::ChunkSink;
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

/// Identifier of one logical stream, bumped on every reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Epoch(u64);

impl Epoch {
    /// Wrap a raw epoch number.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw epoch number.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The epoch that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle for the single outstanding tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickToken {
    epoch: Epoch,
    seq: u64,
    delay: Duration,
}

impl TickToken {
    /// Epoch the tick was scheduled under.
    pub const fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Sequence number, unique within one buffer.
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    /// How long the driver should wait before firing the tick.
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

/// Whether a tick is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Nothing pending, no tick outstanding.
    Idle,
    /// A tick is outstanding.
    Streaming,
}

/// Result of firing a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The token was superseded (reset or already fired). Nothing changed.
    Stale,
    /// Units moved from pending to displayed.
    Advanced {
        /// Units revealed by this tick.
        units: usize,
        /// Bytes of text revealed by this tick.
        bytes: usize,
        /// The next tick to arm, if units remain.
        next: Option<TickToken>,
    },
}

/// Options for [`RevealBuffer::append_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppendOptions {
    /// Reset the stream and discard the chunk.
    pub clear: bool,
}

impl AppendOptions {
    /// Options that turn an append into a reset.
    pub const CLEAR: Self = Self { clear: true };
}

/// What the driver has to do with its timer after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerChange {
    /// Keep whatever is armed.
    Unchanged,
    /// Arm a timer for this token.
    Armed(TickToken),
    /// Disarm the timer for this token.
    Cancelled(TickToken),
}

/// Counters for the current epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevealStats {
    /// Non-empty chunks appended.
    pub chunks: u64,
    /// Units appended.
    pub units_appended: u64,
    /// Units revealed.
    pub units_revealed: u64,
    /// Ticks that advanced the display.
    pub ticks: u64,
}

/// Paced reveal of text arriving in arbitrary bursts.
#[derive(Debug)]
pub struct RevealBuffer {
    config: RevealConfig,
    /// Pending text; bytes before `head` have already been revealed.
    pending: String,
    head: usize,
    /// Byte length of each pending unit, front first.
    unit_lens: VecDeque<usize>,
    display: DisplayProjection,
    epoch: Epoch,
    /// The single outstanding tick.
    timer: Option<TickToken>,
    next_seq: u64,
    stats: RevealStats,
}

/// Revealed bytes kept in `pending` before it is compacted.
const COMPACT_THRESHOLD: usize = 4096;

impl RevealBuffer {
    /// Create an empty, idle buffer.
    pub fn new(config: RevealConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: RevealConfig) -> Self {
        Self {
            config,
            pending: String::new(),
            head: 0,
            unit_lens: VecDeque::new(),
            display: DisplayProjection::new(),
            epoch: Epoch::default(),
            timer: None,
            next_seq: 0,
            stats: RevealStats::default(),
        }
    }

    /// Pacing configuration.
    pub const fn config(&self) -> &RevealConfig {
        &self.config
    }

    /// The revealed text.
    pub const fn displayed(&self) -> &DisplayProjection {
        &self.display
    }

    /// Current stream epoch.
    pub const fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// The outstanding tick, if any.
    pub const fn outstanding(&self) -> Option<TickToken> {
        self.timer
    }

    /// Idle or streaming.
    pub const fn state(&self) -> StreamState {
        if self.timer.is_some() {
            StreamState::Streaming
        } else {
            StreamState::Idle
        }
    }

    /// Whether no units are waiting to be revealed.
    pub fn is_empty(&self) -> bool {
        self.unit_lens.is_empty()
    }

    /// Units waiting to be revealed.
    pub fn pending_units(&self) -> usize {
        self.unit_lens.len()
    }

    /// Counters for the current epoch.
    pub const fn stats(&self) -> RevealStats {
        self.stats
    }

    /// Queue a chunk for reveal.
    ///
    /// Returns the token to arm when this append started a new tick. If a
    /// tick is already outstanding the units simply join the queue and
    /// `None` is returned. Empty chunks are ignored.
    pub fn append(&mut self, chunk: &str) -> Option<TickToken> {
        let units = self.config.unit.split(chunk);
        if units.is_empty() {
            return None;
        }

        self.compact();
        self.unit_lens.extend(units.iter().map(|unit| unit.len()));
        self.pending.push_str(chunk);
        self.stats.chunks += 1;
        self.stats.units_appended += units.len() as u64;

        if self.timer.is_some() {
            return None;
        }

        // First tick of a burst fires immediately; later ones are paced.
        let token = self.schedule(Duration::ZERO);
        tracing::trace!(epoch = %self.epoch, seq = token.seq, "stream started");
        Some(token)
    }

    /// Append, or reset when `options.clear` is set (the chunk is dropped).
    pub fn append_with(&mut self, chunk: &str, options: AppendOptions) -> TimerChange {
        if options.clear {
            return self
                .reset()
                .map_or(TimerChange::Unchanged, TimerChange::Cancelled);
        }
        self.append(chunk)
            .map_or(TimerChange::Unchanged, TimerChange::Armed)
    }

    /// Reveal the next batch.
    ///
    /// Up to `batch_size` units move to the display; a final partial batch
    /// is drained in full. If units remain, the next token is scheduled
    /// with the configured delay.
    pub fn tick(&mut self, token: TickToken) -> TickOutcome {
        if token.epoch != self.epoch {
            tracing::trace!(token = %token.epoch, current = %self.epoch, "stale tick epoch");
            return TickOutcome::Stale;
        }
        if self.timer != Some(token) {
            tracing::trace!(seq = token.seq, "tick is not the outstanding one");
            return TickOutcome::Stale;
        }
        self.timer = None;
        debug_assert!(!self.unit_lens.is_empty(), "tick armed with nothing pending");

        let units = self.config.batch_size.min(self.unit_lens.len());
        let bytes: usize = self.unit_lens.drain(..units).sum();
        let end = self.head + bytes;
        self.display.extend(&self.pending[self.head..end], units);
        self.head = end;
        self.stats.ticks += 1;
        self.stats.units_revealed += units as u64;

        let next = if self.unit_lens.is_empty() {
            self.pending.clear();
            self.head = 0;
            tracing::trace!(epoch = %self.epoch, ticks = self.stats.ticks, "stream drained");
            None
        } else {
            Some(self.schedule(self.config.delay()))
        };

        TickOutcome::Advanced { units, bytes, next }
    }

    /// Cancel the outstanding tick, drop all text and start a new epoch.
    ///
    /// Returns the cancelled token so the driver can disarm its timer.
    pub fn reset(&mut self) -> Option<TickToken> {
        let cancelled = self.timer.take();
        self.pending.clear();
        self.head = 0;
        self.unit_lens.clear();
        self.epoch = self.epoch.next();
        self.display.clear(self.epoch);
        self.stats = RevealStats::default();
        tracing::debug!(epoch = %self.epoch, cancelled = cancelled.is_some(), "stream reset");
        cancelled
    }

    fn schedule(&mut self, delay: Duration) -> TickToken {
        debug_assert!(self.timer.is_none(), "a tick is already outstanding");
        let token = TickToken {
            epoch: self.epoch,
            seq: self.next_seq,
            delay,
        };
        self.next_seq += 1;
        self.timer = Some(token);
        token
    }

    /// Drop already revealed bytes once they dominate the pending string.
    fn compact(&mut self) {
        if self.head >= COMPACT_THRESHOLD && self.head * 2 >= self.pending.len() {
            self.pending.drain(..self.head);
            self.head = 0;
        }
    }
}

impl Default for RevealBuffer {
    fn default() -> Self {
        Self::with_valid_config(RevealConfig::default())
    }
}

impl ChunkSink for RevealBuffer {
    fn push_chunk(&mut self, chunk: &str) -> Result<()> {
        self.append(chunk);
        Ok(())
    }
}
