//! Unit segmentation: what one step of the reveal shows.

use crate::error::Error;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use unicode_segmentation::UnicodeSegmentation;

/// The smallest piece of text the scheduler drains per batch slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitMode {
    /// Extended grapheme clusters ("é", "👍🏽" count as one).
    #[default]
    Grapheme,
    /// Unicode scalar values.
    Char,
    /// Word-boundary tokens: words, punctuation and whitespace runs.
    Word,
}

impl UnitMode {
    /// Split `chunk` into units, preserving every byte in order.
    ///
    /// Segmentation is per chunk. A word or cluster cut across two chunks
    /// becomes two units; the concatenation is unaffected.
    pub fn split(self, chunk: &str) -> Vec<&str> {
        match self {
            Self::Grapheme => chunk.graphemes(true).collect(),
            Self::Char => chunk
                .char_indices()
                .map(|(start, ch)| &chunk[start..start + ch.len_utf8()])
                .collect(),
            Self::Word => chunk.split_word_bounds().collect(),
        }
    }

    /// Name used in configuration and on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grapheme => "grapheme",
            Self::Char => "char",
            Self::Word => "word",
        }
    }
}

impl fmt::Display for UnitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grapheme" => Ok(Self::Grapheme),
            "char" => Ok(Self::Char),
            "word" => Ok(Self::Word),
            other => Err(Error::InvalidConfig(format!(
                "unknown unit mode '{other}' (expected grapheme, char or word)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grapheme_keeps_clusters_together() {
        let units = UnitMode::Grapheme.split("e\u{301}a👍🏽");
        assert_eq!(units, vec!["e\u{301}", "a", "👍🏽"]);
    }

    #[test]
    fn test_char_splits_scalars() {
        let units = UnitMode::Char.split("e\u{301}x");
        assert_eq!(units, vec!["e", "\u{301}", "x"]);
    }

    #[test]
    fn test_word_separates_whitespace() {
        let units = UnitMode::Word.split("Hello, big world");
        assert_eq!(units, vec!["Hello", ",", " ", "big", " ", "world"]);
    }

    #[test]
    fn test_split_preserves_text() {
        let text = "## Title\n\n| a | b |\n|---|---|\nnaïve café 🚀";
        for mode in [UnitMode::Grapheme, UnitMode::Char, UnitMode::Word] {
            assert_eq!(mode.split(text).concat(), text, "mode {mode}");
        }
    }

    #[test]
    fn test_empty_chunk_has_no_units() {
        assert!(UnitMode::Word.split("").is_empty());
    }

    #[test]
    fn test_parse() {
        assert_eq!("word".parse::<UnitMode>().unwrap(), UnitMode::Word);
        assert_eq!(" Char ".parse::<UnitMode>().unwrap(), UnitMode::Char);
        assert!("line".parse::<UnitMode>().is_err());
    }
}
