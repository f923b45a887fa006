//! Configuration: pacing knobs and producer settings.
//!
//! Every field has a default, so a TOML file only needs the keys it wants
//! to change:
//!
//! ```toml
//! [reveal]
//! delay_ms = 20
//! batch_size = 3
//! unit = "word"
//!
//! [producer]
//! chunked = true
//! command = ["ollama", "run", "llama3"]
//! ```

use crate::error::{Error, Result};
use crate::producer::Delivery;
use crate::reveal::UnitMode;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Pacing configuration for a reveal buffer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevealConfig {
    /// Milliseconds between two ticks.
    pub delay_ms: u64,
    /// Maximum units revealed per tick.
    pub batch_size: usize,
    /// What counts as one unit.
    pub unit: UnitMode,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            delay_ms: 5,
            batch_size: 1,
            unit: UnitMode::Grapheme,
        }
    }
}

impl RevealConfig {
    /// Delay between two ticks.
    pub const fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Set the delay between ticks (millisecond precision).
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the number of units revealed per tick.
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the unit segmentation mode.
    #[must_use]
    pub const fn with_unit(mut self, unit: UnitMode) -> Self {
        self.unit = unit;
        self
    }

    /// Check that the values can drive a buffer.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be at least 1".into()));
        }
        Ok(())
    }
}

/// How responses are obtained and fed into the reveal buffer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProducerConfig {
    /// Replay the response as small chunks instead of one burst.
    pub chunked: bool,
    /// Smallest simulated chunk, in chars.
    pub chunk_min: usize,
    /// Largest simulated chunk, in chars.
    pub chunk_max: usize,
    /// Pause between simulated chunks, in milliseconds.
    pub chunk_interval_ms: u64,
    /// External program (and arguments) that answers prompts on stdout.
    /// Empty means the built-in canned response.
    pub command: Vec<String>,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            chunked: false,
            chunk_min: 1,
            chunk_max: 3,
            chunk_interval_ms: 10,
            command: Vec::new(),
        }
    }
}

impl ProducerConfig {
    /// Delivery strategy described by this configuration.
    pub const fn delivery(&self) -> Delivery {
        if self.chunked {
            Delivery::Chunked {
                min: self.chunk_min,
                max: self.chunk_max,
                interval: Duration::from_millis(self.chunk_interval_ms),
            }
        } else {
            Delivery::OneShot
        }
    }

    /// Check chunk bounds.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_min == 0 {
            return Err(Error::InvalidConfig("chunk_min must be at least 1".into()));
        }
        if self.chunk_min > self.chunk_max {
            return Err(Error::InvalidConfig(format!(
                "chunk_min ({}) exceeds chunk_max ({})",
                self.chunk_min, self.chunk_max
            )));
        }
        Ok(())
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Pacing settings.
    pub reveal: RevealConfig,
    /// Producer settings.
    pub producer: ProducerConfig,
}

impl Config {
    /// Load and validate a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.reveal.validate()?;
        self.producer.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.reveal.delay(), Duration::from_millis(5));
        assert_eq!(config.reveal.batch_size, 1);
        assert_eq!(config.reveal.unit, UnitMode::Grapheme);
        assert_eq!(config.producer.delivery(), Delivery::OneShot);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let file = write_config("[reveal]\nbatch_size = 3\nunit = \"word\"\n");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.reveal.batch_size, 3);
        assert_eq!(config.reveal.unit, UnitMode::Word);
        assert_eq!(config.reveal.delay_ms, 5);
        assert!(!config.producer.chunked);
    }

    #[test]
    fn test_load_producer_section() {
        let file = write_config(
            "[producer]\nchunked = true\nchunk_min = 2\nchunk_max = 4\ncommand = [\"cat\"]\n",
        );
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.producer.command, vec!["cat".to_string()]);
        assert_eq!(
            config.producer.delivery(),
            Delivery::Chunked {
                min: 2,
                max: 4,
                interval: Duration::from_millis(10),
            }
        );
    }

    #[test]
    fn test_load_rejects_zero_batch() {
        let file = write_config("[reveal]\nbatch_size = 0\n");
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_load_rejects_inverted_chunk_bounds() {
        let file = write_config("[producer]\nchunk_min = 5\nchunk_max = 2\n");
        assert!(matches!(
            Config::load(file.path()),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_reports_parse_errors_with_path() {
        let file = write_config("[reveal]\nunit = \"sentence\"\n");
        match Config::load(file.path()) {
            Err(Error::Config { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_builder_methods() {
        let config = RevealConfig::default()
            .with_delay(Duration::from_millis(400))
            .with_batch_size(20)
            .with_unit(UnitMode::Char);
        assert_eq!(config.delay_ms, 400);
        assert_eq!(config.batch_size, 20);
        assert_eq!(config.unit, UnitMode::Char);
    }
}
