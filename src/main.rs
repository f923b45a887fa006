//! `trickle`: reveal LLM responses in the terminal at a steady pace.
//!
//! Prompts are read from stdin, one per line. Each prompt supersedes the
//! previous stream; its response is revealed on stdout.

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::{unbounded, Receiver};
use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use tracing_subscriber::EnvFilter;
use trickle::{
    CannedResponder, CommandResponder, Config, PacerActor, Responder, RevealPrinter, Session,
    UnitMode,
};

/// Reveal LLM responses at a steady pace.
#[derive(Parser, Debug)]
#[command(name = "trickle", version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Milliseconds between reveal ticks
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Units revealed per tick
    #[arg(long)]
    batch_size: Option<usize>,

    /// Unit of reveal: grapheme, char or word
    #[arg(long)]
    unit: Option<UnitMode>,

    /// Replay responses as small chunks to simulate streaming
    #[arg(long)]
    chunked: bool,

    /// Smallest simulated chunk, in chars
    #[arg(long)]
    chunk_min: Option<usize>,

    /// Largest simulated chunk, in chars
    #[arg(long)]
    chunk_max: Option<usize>,

    /// Pause between simulated chunks, in milliseconds
    #[arg(long)]
    chunk_interval_ms: Option<u64>,

    /// Program that answers a prompt (read on stdin) on stdout, e.g.
    /// `trickle -- ollama run llama3`
    #[arg(last = true)]
    command: Vec<String>,
}

impl Cli {
    /// Merge the config file (if any) with command-line overrides.
    fn resolve(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        let reveal = &mut config.reveal;
        if let Some(delay_ms) = self.delay_ms {
            reveal.delay_ms = delay_ms;
        }
        if let Some(batch_size) = self.batch_size {
            reveal.batch_size = batch_size;
        }
        if let Some(unit) = self.unit {
            reveal.unit = unit;
        }

        let producer = &mut config.producer;
        producer.chunked |= self.chunked;
        if let Some(chunk_min) = self.chunk_min {
            producer.chunk_min = chunk_min;
        }
        if let Some(chunk_max) = self.chunk_max {
            producer.chunk_max = chunk_max;
        }
        if let Some(interval) = self.chunk_interval_ms {
            producer.chunk_interval_ms = interval;
        }
        if !self.command.is_empty() {
            producer.command = self.command;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    init_tracing();
    let config = Cli::parse().resolve()?;

    let responder: Arc<dyn Responder> = if config.producer.command.is_empty() {
        Arc::new(CannedResponder::sample())
    } else {
        Arc::new(CommandResponder::from_argv(&config.producer.command)?)
    };

    let pacer = PacerActor::spawn(config.reveal.clone()).context("failed to start pacer")?;
    let session = Session::new(&pacer, responder, config.producer.delivery());

    let stdout = io::stdout();
    let styled = stdout.is_terminal();
    let mut printer = RevealPrinter::new(stdout.lock(), styled);

    session.run(&mut printer, read_prompts()?)?;
    pacer.join();
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Read non-blank lines from stdin on a dedicated thread.
///
/// The channel disconnects at end of input.
fn read_prompts() -> Result<Receiver<String>> {
    let (tx, rx) = unbounded();
    thread::Builder::new()
        .name("trickle-input".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let prompt = match line {
                    Ok(line) => line.trim().to_string(),
                    Err(err) => {
                        tracing::warn!(error = %err, "failed to read prompt");
                        break;
                    }
                };
                if prompt.is_empty() {
                    continue;
                }
                if tx.send(prompt).is_err() {
                    break;
                }
            }
        })
        .context("failed to start input thread")?;
    Ok(rx)
}
