//! Pacer Actor: Dedicated thread that drives one reveal buffer.
//!
//! The thread is the buffer's only event loop. It waits on two sources at
//! once: the command channel and the deadline of the single armed tick.
//! Because every mutation happens on this thread, no locks are needed and
//! a reset can never interleave with half a tick.

use super::messages::{DisplayUpdate, RevealCommand};
use crate::config::RevealConfig;
use crate::error::{Error, Result};
use crate::producer::ChunkSink;
use crate::reveal::{AppendOptions, Epoch, RevealBuffer, StreamState, TickOutcome, TickToken};
use crossbeam_channel::{at, bounded, never, select, unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Pacer actor that reveals text on its own thread.
pub struct PacerActor {
    /// Handle to the pacer thread.
    handle: Option<JoinHandle<()>>,
    /// Command side, cloned out to producers.
    commands: PacerHandle,
    /// Receiver for display updates.
    updates: Receiver<DisplayUpdate>,
}

impl PacerActor {
    /// Spawn a pacer thread owning a fresh buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid or the OS refuses to spawn
    /// the thread.
    pub fn spawn(config: RevealConfig) -> Result<Self> {
        let buffer = RevealBuffer::new(config)?;
        let epoch = Arc::new(AtomicU64::new(buffer.epoch().get()));

        // Unbounded: appends must never block the producer.
        let (command_tx, command_rx) = unbounded();
        let (update_tx, update_rx) = unbounded();

        let pacer = Pacer {
            buffer,
            armed: None,
            updates: update_tx,
            epoch: Arc::clone(&epoch),
        };
        let handle = thread::Builder::new()
            .name("trickle-pacer".to_string())
            .spawn(move || pacer.run_loop(&command_rx))?;

        Ok(Self {
            handle: Some(handle),
            commands: PacerHandle {
                tx: command_tx,
                epoch,
            },
            updates: update_rx,
        })
    }

    /// Get a reference to the display update receiver.
    ///
    /// Use this with `select!` alongside other event sources:
    ///
    /// ```ignore
    /// loop {
    ///     select! {
    ///         recv(prompts) -> prompt => submit(prompt),
    ///         recv(pacer.updates()) -> update => printer.apply(&update?)?,
    ///     }
    /// }
    /// ```
    #[inline]
    pub const fn updates(&self) -> &Receiver<DisplayUpdate> {
        &self.updates
    }

    /// A cloneable command handle.
    pub fn handle(&self) -> PacerHandle {
        self.commands.clone()
    }

    /// Signal the pacer to shutdown.
    pub fn shutdown(&self) {
        let _ = self.commands.tx.send(RevealCommand::Shutdown);
    }

    /// Wait for the pacer thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PacerActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Cloneable command side of a [`PacerActor`].
#[derive(Debug, Clone)]
pub struct PacerHandle {
    tx: Sender<RevealCommand>,
    /// Mirror of the pacer's epoch, updated before a reset is acknowledged.
    epoch: Arc<AtomicU64>,
}

impl PacerHandle {
    /// Queue a chunk on whatever stream is current.
    pub fn append(&self, chunk: impl Into<String>) -> Result<()> {
        self.send(RevealCommand::Append {
            chunk: chunk.into(),
            epoch: None,
        })
    }

    /// Append, or reset when `options.clear` is set (the chunk is dropped).
    pub fn append_with(&self, chunk: impl Into<String>, options: AppendOptions) -> Result<()> {
        if options.clear {
            self.reset().map(drop)
        } else {
            self.append(chunk)
        }
    }

    /// Reset the stream and wait for the pacer to acknowledge.
    ///
    /// Once this returns, no update belonging to an earlier epoch will be
    /// published after the [`DisplayUpdate::Reset`] for the returned epoch.
    pub fn reset(&self) -> Result<Epoch> {
        let (ack_tx, ack_rx) = bounded(1);
        self.send(RevealCommand::Reset { ack: ack_tx })?;
        ack_rx.recv().map_err(|_| Error::Disconnected)
    }

    /// Whether the pacer still has text to reveal.
    ///
    /// Round-trips through the pacer thread, so every chunk sent through
    /// this handle beforehand is accounted for.
    pub fn state(&self) -> Result<StreamState> {
        let (ack_tx, ack_rx) = bounded(1);
        self.send(RevealCommand::Status { ack: ack_tx })?;
        ack_rx.recv().map_err(|_| Error::Disconnected)
    }

    /// The pacer's current epoch.
    pub fn current_epoch(&self) -> Epoch {
        Epoch::new(self.epoch.load(Ordering::Acquire))
    }

    /// A sink that feeds `epoch` and refuses once it is superseded.
    pub fn sink(&self, epoch: Epoch) -> EpochSink {
        EpochSink {
            handle: self.clone(),
            epoch,
        }
    }

    fn send(&self, command: RevealCommand) -> Result<()> {
        self.tx.send(command).map_err(|_| Error::Disconnected)
    }
}

/// Chunk sink bound to one stream epoch.
#[derive(Debug, Clone)]
pub struct EpochSink {
    handle: PacerHandle,
    epoch: Epoch,
}

impl EpochSink {
    /// Epoch this sink feeds.
    pub const fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Whether the pacer is still on this sink's epoch.
    pub fn is_current(&self) -> bool {
        self.handle.current_epoch() == self.epoch
    }
}

impl ChunkSink for EpochSink {
    fn push_chunk(&mut self, chunk: &str) -> Result<()> {
        if !self.is_current() {
            return Err(Error::Superseded);
        }
        self.handle.send(RevealCommand::Append {
            chunk: chunk.to_owned(),
            epoch: Some(self.epoch),
        })
    }
}

/// State owned by the pacer thread.
struct Pacer {
    buffer: RevealBuffer,
    /// The single armed tick and when it is due.
    armed: Option<(TickToken, Instant)>,
    updates: Sender<DisplayUpdate>,
    epoch: Arc<AtomicU64>,
}

impl Pacer {
    /// Main pacer loop.
    fn run_loop(mut self, commands: &Receiver<RevealCommand>) {
        tracing::debug!(config = ?self.buffer.config(), "pacer started");
        loop {
            let deadline = self.armed.map_or_else(never, |(_, due)| at(due));

            select! {
                recv(commands) -> command => match command {
                    Ok(RevealCommand::Append { chunk, epoch }) => self.append(&chunk, epoch),
                    Ok(RevealCommand::Reset { ack }) => {
                        let epoch = self.reset();
                        let _ = ack.send(epoch);
                    }
                    Ok(RevealCommand::Status { ack }) => {
                        let _ = ack.send(self.buffer.state());
                    }
                    Ok(RevealCommand::Shutdown) | Err(_) => break,
                },
                recv(deadline) -> _ => self.fire(),
            }
        }
        tracing::debug!(epoch = %self.buffer.epoch(), "pacer stopped");
    }

    fn append(&mut self, chunk: &str, epoch: Option<Epoch>) {
        if let Some(epoch) = epoch {
            if epoch != self.buffer.epoch() {
                tracing::trace!(%epoch, current = %self.buffer.epoch(), "dropped chunk for superseded stream");
                return;
            }
        }
        if let Some(token) = self.buffer.append(chunk) {
            self.armed = Some((token, Instant::now() + token.delay()));
        }
    }

    fn reset(&mut self) -> Epoch {
        // Disarming here is the synchronous cancel; the token check in
        // `tick` covers a deadline that already fired.
        self.buffer.reset();
        self.armed = None;
        let epoch = self.buffer.epoch();
        self.epoch.store(epoch.get(), Ordering::Release);
        let _ = self.updates.send(DisplayUpdate::Reset { epoch });
        epoch
    }

    fn fire(&mut self) {
        let Some((token, due)) = self.armed.take() else {
            return;
        };

        match self.buffer.tick(token) {
            TickOutcome::Advanced { units, bytes, next } => {
                let display = self.buffer.displayed();
                let text = &display.as_str()[display.as_str().len() - bytes..];
                let _ = self.updates.send(DisplayUpdate::Revealed {
                    epoch: display.epoch(),
                    units,
                    text: text.to_owned(),
                });

                match next {
                    Some(next) => {
                        let now = Instant::now();
                        let mut next_due = due + next.delay();
                        // Behind schedule: catch up without bunching ticks.
                        if next_due < now {
                            next_due = now + next.delay();
                        }
                        self.armed = Some((next, next_due));
                    }
                    None => {
                        let _ = self.updates.send(DisplayUpdate::Idle {
                            epoch: self.buffer.epoch(),
                        });
                    }
                }
            }
            TickOutcome::Stale => tracing::trace!(seq = token.seq(), "tick ignored"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reveal::DisplayProjection;
    use std::time::Duration;

    fn spawn(delay_ms: u64, batch_size: usize) -> PacerActor {
        PacerActor::spawn(
            RevealConfig::default()
                .with_delay(Duration::from_millis(delay_ms))
                .with_batch_size(batch_size),
        )
        .unwrap()
    }

    /// Apply updates until the given epoch goes idle.
    fn wait_idle(pacer: &PacerActor, projection: &mut DisplayProjection, epoch: Epoch) {
        loop {
            let update = pacer
                .updates()
                .recv_timeout(Duration::from_secs(2))
                .expect("pacer went quiet");
            projection.apply(&update);
            if update == (DisplayUpdate::Idle { epoch }) {
                return;
            }
        }
    }

    #[test]
    fn test_pacer_reveals_appended_text() {
        let pacer = spawn(1, 1);
        let handle = pacer.handle();
        handle.append("Hello, ").unwrap();
        handle.append("world!").unwrap();

        let mut projection = DisplayProjection::new();
        wait_idle(&pacer, &mut projection, Epoch::new(0));
        assert_eq!(projection.as_str(), "Hello, world!");
        assert_eq!(projection.units(), 13);

        pacer.join();
    }

    #[test]
    fn test_pacer_paces_reveals() {
        let pacer = spawn(20, 1);
        let start = Instant::now();
        pacer.handle().append("abc").unwrap();

        let mut projection = DisplayProjection::new();
        wait_idle(&pacer, &mut projection, Epoch::new(0));

        // First unit is immediate, the other two wait one delay each.
        assert!(start.elapsed() >= Duration::from_millis(40));
        assert_eq!(projection.as_str(), "abc");
        pacer.join();
    }

    #[test]
    fn test_reset_stops_old_stream() {
        let pacer = spawn(10, 1);
        let handle = pacer.handle();
        handle.append("ABCDEFGHIJKLMNOP").unwrap();

        let first = pacer.updates().recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(first.epoch(), Epoch::new(0));

        let epoch = handle.reset().unwrap();
        assert_eq!(epoch, Epoch::new(1));
        assert_eq!(handle.current_epoch(), epoch);

        // Skip whatever was published before the reset.
        loop {
            let update = pacer.updates().recv_timeout(Duration::from_secs(1)).unwrap();
            if update == (DisplayUpdate::Reset { epoch }) {
                break;
            }
            assert_eq!(update.epoch(), Epoch::new(0));
        }
        assert!(pacer
            .updates()
            .recv_timeout(Duration::from_millis(60))
            .is_err());

        handle.append("Y").unwrap();
        let mut projection = DisplayProjection::new();
        projection.apply(&DisplayUpdate::Reset { epoch });
        wait_idle(&pacer, &mut projection, epoch);
        assert_eq!(projection.as_str(), "Y");
        pacer.join();
    }

    #[test]
    fn test_state_accounts_for_sent_chunks() {
        let pacer = spawn(50, 1);
        let handle = pacer.handle();
        assert_eq!(handle.state().unwrap(), StreamState::Idle);
        handle.append("slow").unwrap();
        assert_eq!(handle.state().unwrap(), StreamState::Streaming);

        let mut projection = DisplayProjection::new();
        wait_idle(&pacer, &mut projection, Epoch::new(0));
        assert_eq!(handle.state().unwrap(), StreamState::Idle);
        pacer.join();
    }

    #[test]
    fn test_superseded_sink_is_refused() {
        let pacer = spawn(1, 1);
        let handle = pacer.handle();
        let mut sink = handle.sink(handle.current_epoch());
        sink.push_chunk("first").unwrap();

        handle.reset().unwrap();
        assert!(!sink.is_current());
        assert!(matches!(sink.push_chunk("late"), Err(Error::Superseded)));
        pacer.join();
    }

    #[test]
    fn test_append_with_clear_resets() {
        let pacer = spawn(1, 1);
        let handle = pacer.handle();
        handle.append_with("dropped", AppendOptions::CLEAR).unwrap();
        assert_eq!(handle.current_epoch(), Epoch::new(1));
        assert_eq!(
            pacer.updates().recv_timeout(Duration::from_secs(1)).unwrap(),
            DisplayUpdate::Reset { epoch: Epoch::new(1) }
        );
        pacer.join();
    }

    #[test]
    fn test_handle_after_shutdown() {
        let pacer = spawn(1, 1);
        let handle = pacer.handle();
        pacer.join();
        assert!(matches!(handle.append("x"), Err(Error::Disconnected)));
        assert!(matches!(handle.reset(), Err(Error::Disconnected)));
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(PacerActor::spawn(RevealConfig::default().with_batch_size(0)).is_err());
    }
}
