//! Display projection: the growing string a consumer renders.

use super::Epoch;
use crate::actor::DisplayUpdate;

/// Read-only, monotonically growing view of revealed text.
///
/// Between resets the text only ever gets longer. `revision` moves on
/// every change (including resets), so a consumer can compare it with the
/// last value it rendered and skip redundant redraws.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayProjection {
    text: String,
    units: usize,
    revision: u64,
    epoch: Epoch,
}

impl DisplayProjection {
    /// Create an empty projection for epoch zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// The revealed text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of units revealed so far in this epoch.
    #[inline]
    pub const fn units(&self) -> usize {
        self.units
    }

    /// Change counter, bumped on every mutation.
    #[inline]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Epoch the text belongs to.
    #[inline]
    pub const fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Whether nothing has been revealed yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Append `count` units spelled by `text`.
    pub(crate) fn extend(&mut self, text: &str, count: usize) {
        if count == 0 {
            return;
        }
        self.text.push_str(text);
        self.units += count;
        self.revision += 1;
    }

    /// Empty the projection and move it to `epoch`.
    pub(crate) fn clear(&mut self, epoch: Epoch) {
        self.text.clear();
        self.units = 0;
        self.epoch = epoch;
        self.revision += 1;
    }

    /// Rebuild state from an update published by a pacer.
    ///
    /// Updates from an epoch older than the current one are ignored. A
    /// reveal from a newer epoch implies a reset the consumer missed, so
    /// the text is cleared first. Returns whether anything changed.
    pub fn apply(&mut self, update: &DisplayUpdate) -> bool {
        match update {
            DisplayUpdate::Reset { epoch } => {
                if *epoch < self.epoch {
                    return false;
                }
                self.clear(*epoch);
                true
            }
            DisplayUpdate::Revealed { epoch, units, text, .. } => {
                if *epoch < self.epoch {
                    return false;
                }
                if *epoch > self.epoch {
                    self.clear(*epoch);
                }
                self.extend(text, *units);
                true
            }
            DisplayUpdate::Idle { .. } => false,
        }
    }
}

impl AsRef<str> for DisplayProjection {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn revealed(epoch: u64, text: &str) -> DisplayUpdate {
        DisplayUpdate::Revealed {
            epoch: Epoch::new(epoch),
            units: text.chars().count(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_extend_bumps_revision() {
        let mut projection = DisplayProjection::new();
        projection.extend("ab", 2);
        projection.extend("", 0);
        assert_eq!(projection.as_str(), "ab");
        assert_eq!(projection.units(), 2);
        assert_eq!(projection.revision(), 1);
    }

    #[test]
    fn test_apply_ignores_older_epochs() {
        let mut projection = DisplayProjection::new();
        assert!(projection.apply(&DisplayUpdate::Reset { epoch: Epoch::new(2) }));
        assert!(!projection.apply(&revealed(1, "old")));
        assert!(projection.apply(&revealed(2, "new")));
        assert_eq!(projection.as_str(), "new");
    }

    #[test]
    fn test_apply_newer_epoch_clears_first() {
        let mut projection = DisplayProjection::new();
        projection.apply(&revealed(0, "X"));
        projection.apply(&revealed(1, "Y"));
        assert_eq!(projection.as_str(), "Y");
        assert_eq!(projection.epoch(), Epoch::new(1));
    }

    #[test]
    fn test_apply_idle_changes_nothing() {
        let mut projection = DisplayProjection::new();
        projection.apply(&revealed(0, "hi"));
        let revision = projection.revision();
        assert!(!projection.apply(&DisplayUpdate::Idle { epoch: Epoch::new(0) }));
        assert_eq!(projection.revision(), revision);
    }
}
