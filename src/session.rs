//! Session: the prompt loop behind the `trickle` binary.
//!
//! Every prompt supersedes the stream before it. The session resets the
//! pacer, prints the prompt once the old stream's tail is on screen, and
//! answers it on a producer thread. When the prompt source closes, the
//! session waits for the last answer to be fully revealed and returns.

use crate::actor::{DisplayUpdate, PacerActor, PacerHandle};
use crate::error::{Error, Result};
use crate::producer::{run_prompt, Delivery, Responder};
use crate::reveal::{Epoch, StreamState};
use crate::terminal::RevealPrinter;
use crossbeam_channel::{never, select, unbounded, Receiver, Sender};
use std::io::Write;
use std::sync::Arc;
use std::thread;

/// Prompt loop state.
pub struct Session {
    handle: PacerHandle,
    updates: Receiver<DisplayUpdate>,
    responder: Arc<dyn Responder>,
    delivery: Delivery,
    /// Producers report the epoch they fed once they finish.
    done: (Sender<Epoch>, Receiver<Epoch>),
}

impl Session {
    /// Create a session answering prompts with `responder` through `pacer`.
    pub fn new(pacer: &PacerActor, responder: Arc<dyn Responder>, delivery: Delivery) -> Self {
        Self {
            handle: pacer.handle(),
            updates: pacer.updates().clone(),
            responder,
            delivery,
            done: unbounded(),
        }
    }

    /// Answer prompts until `prompts` disconnects and the last answer is
    /// fully revealed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disconnected`] if the pacer stops, or an I/O error
    /// from the printer.
    pub fn run<W: Write>(
        &self,
        printer: &mut RevealPrinter<W>,
        mut prompts: Receiver<String>,
    ) -> Result<()> {
        let mut input_open = true;
        let mut producing = false;

        loop {
            if !input_open && !producing && self.handle.state()? == StreamState::Idle {
                break;
            }

            select! {
                recv(prompts) -> prompt => match prompt {
                    Ok(prompt) => {
                        self.submit(printer, prompt)?;
                        producing = true;
                    }
                    Err(_) => {
                        tracing::debug!("input closed");
                        input_open = false;
                        prompts = never();
                    }
                },
                recv(self.done.1) -> epoch => {
                    // A superseded producer finishing says nothing about the
                    // current stream.
                    if epoch.ok() == Some(self.handle.current_epoch()) {
                        producing = false;
                    }
                }
                recv(self.updates) -> update => {
                    printer.apply(&update.map_err(|_| Error::Disconnected)?)?;
                }
            }
        }

        // Everything published before the final status check.
        while let Ok(update) = self.updates.try_recv() {
            printer.apply(&update)?;
        }
        Ok(())
    }

    /// Supersede the current stream and start answering `prompt`.
    fn submit<W: Write>(&self, printer: &mut RevealPrinter<W>, prompt: String) -> Result<()> {
        let epoch = self.handle.reset()?;
        // Flush the old stream's tail so the header lands after it.
        loop {
            let update = self.updates.recv().map_err(|_| Error::Disconnected)?;
            printer.apply(&update)?;
            if update == (DisplayUpdate::Reset { epoch }) {
                break;
            }
        }
        printer.header(&prompt)?;
        tracing::info!(%epoch, "prompt submitted");

        let responder = Arc::clone(&self.responder);
        let delivery = self.delivery;
        let mut sink = self.handle.sink(epoch);
        let done = self.done.0.clone();
        thread::Builder::new()
            .name("trickle-producer".to_string())
            .spawn(move || {
                match run_prompt(responder.as_ref(), &prompt, &delivery, &mut sink) {
                    Ok(()) => {}
                    Err(Error::Superseded) => tracing::debug!(%epoch, "producer superseded"),
                    Err(err) => tracing::warn!(%epoch, error = %err, "producer failed"),
                }
                let _ = done.send(epoch);
            })?;
        Ok(())
    }
}
