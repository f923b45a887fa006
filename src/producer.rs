//! Producers: where revealed text comes from.
//!
//! A [`Responder`] turns a prompt into a complete response (or fails with a
//! message). A [`Delivery`] decides how that response reaches a
//! [`ChunkSink`]: in one burst, or replayed as small chunks to mimic a
//! streaming backend. [`run_prompt`] glues the two together and makes sure
//! a failure still produces visible text.

use crate::error::{Error, Result};
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

/// Anything that accepts text fragments in arrival order.
pub trait ChunkSink {
    /// Accept one fragment. Fragment boundaries carry no meaning.
    ///
    /// Returns [`Error::Superseded`] when the stream being fed has been
    /// replaced, which tells the producer to stop.
    fn push_chunk(&mut self, chunk: &str) -> Result<()>;
}

/// Backend that answers a prompt with a complete response.
pub trait Responder: Send + Sync {
    /// Produce the full response text for `prompt`.
    fn respond(&self, prompt: &str) -> Result<String>;
}

/// Response used when no backend command is configured.
pub const SAMPLE_RESPONSE: &str = r"# Paced reveal

Text from the backend is queued as **units** and released a few at a time,
so a one-shot answer and a trickling stream look the same on screen.

| Knob         | Meaning                         | Default |
|--------------|---------------------------------|---------|
| `delay_ms`   | Pause between two ticks         | 5       |
| `batch_size` | Units revealed per tick         | 1       |
| `unit`       | `grapheme`, `char` or `word`    | grapheme|

> Submitting a new prompt resets the stream; nothing from the old answer
> leaks into the new one.

```rust
let mut buffer = RevealBuffer::default();
buffer.append(response);
```
";

/// Responder that always returns the same text.
#[derive(Debug, Clone)]
pub struct CannedResponder {
    text: String,
}

impl CannedResponder {
    /// Respond with `text` to every prompt.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Respond with [`SAMPLE_RESPONSE`].
    pub fn sample() -> Self {
        Self::new(SAMPLE_RESPONSE)
    }
}

impl Responder for CannedResponder {
    fn respond(&self, _prompt: &str) -> Result<String> {
        Ok(self.text.clone())
    }
}

/// Responder that pipes the prompt through an external program.
///
/// The prompt is written to the program's stdin and its stdout is the
/// response. A non-zero exit status is a failure whose message is the
/// program's stderr.
#[derive(Debug, Clone)]
pub struct CommandResponder {
    program: String,
    args: Vec<String>,
}

impl CommandResponder {
    /// Build from a program and its arguments.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from an argv-style list (`["prog", "arg", ...]`).
    pub fn from_argv(argv: &[String]) -> Result<Self> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| Error::InvalidConfig("responder command is empty".into()))?;
        Ok(Self::new(program.clone(), args.to_vec()))
    }
}

impl Responder for CommandResponder {
    fn respond(&self, prompt: &str) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(Error::Responder("Prompt is required".into()));
        }

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| Error::Responder(format!("failed to run {}: {err}", self.program)))?;

        // Feed stdin from its own thread: a program that writes while it
        // reads would otherwise fill the stdout pipe and stall both sides.
        let writer = match child.stdin.take() {
            Some(mut stdin) => {
                let prompt = prompt.to_string();
                Some(
                    thread::Builder::new()
                        .name("trickle-stdin".to_string())
                        .spawn(move || match stdin.write_all(prompt.as_bytes()) {
                            // The program may answer without reading its input.
                            Err(err) if err.kind() == ErrorKind::BrokenPipe => Ok(()),
                            other => other,
                        })?,
                )
            }
            None => None,
        };

        let output = child.wait_with_output()?;
        if let Some(writer) = writer {
            writer
                .join()
                .map_err(|_| Error::Responder("stdin writer panicked".into()))??;
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr.trim();
            return Err(Error::Responder(if message.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                message.to_string()
            }));
        }

        tracing::debug!(program = %self.program, bytes = output.stdout.len(), "responder answered");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// How a complete response is handed to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delivery {
    /// The whole text in a single chunk.
    #[default]
    OneShot,
    /// Simulated streaming: chunks of `min..=max` chars, `interval` apart.
    Chunked {
        /// Smallest chunk, in chars.
        min: usize,
        /// Largest chunk, in chars.
        max: usize,
        /// Pause between chunks.
        interval: Duration,
    },
}

impl Delivery {
    /// Push `text` into `sink` according to this strategy.
    ///
    /// Stops at the first sink error (typically [`Error::Superseded`]).
    pub fn deliver(&self, text: &str, sink: &mut dyn ChunkSink) -> Result<()> {
        match *self {
            Self::OneShot => sink.push_chunk(text),
            Self::Chunked { min, max, interval } => {
                for (i, chunk) in simulated_chunks(text, min, max).into_iter().enumerate() {
                    if i > 0 && !interval.is_zero() {
                        thread::sleep(interval);
                    }
                    sink.push_chunk(chunk)?;
                }
                Ok(())
            }
        }
    }
}

/// Cut `text` into chunks of `min..=max` chars on char boundaries.
///
/// Sizes vary pseudo-randomly but deterministically with the position in
/// the text.
fn simulated_chunks(text: &str, min: usize, max: usize) -> Vec<&str> {
    let min = min.max(1);
    let span = max.max(min) - min + 1;
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(index, _)| index)
        .chain(std::iter::once(text.len()))
        .collect();
    let total_chars = boundaries.len() - 1;

    let mut chunks = Vec::new();
    let mut start_char = 0;
    while start_char < total_chars {
        let size = min + (start_char * 7) % span;
        let end_char = (start_char + size).min(total_chars);
        chunks.push(&text[boundaries[start_char]..boundaries[end_char]]);
        start_char = end_char;
    }
    chunks
}

/// Answer `prompt` and deliver the result into `sink`.
///
/// A responder failure is not propagated: it becomes the text
/// `"Error: <message>"` and is revealed like any response. The only error
/// returned is one raised by the sink, such as [`Error::Superseded`].
pub fn run_prompt(
    responder: &dyn Responder,
    prompt: &str,
    delivery: &Delivery,
    sink: &mut dyn ChunkSink,
) -> Result<()> {
    let text = match responder.respond(prompt) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(error = %err, "responder failed");
            format!("Error: {err}")
        }
    };
    delivery.deliver(&text, sink)
}
