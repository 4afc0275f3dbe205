//! Types for the generic artifact stage runner.

use thiserror::Error;

use crate::catalog::CatalogEntry;

/// Order in which a stage walks the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Ascending idx - the archive backfills from the beginning.
    OldestFirst,
    /// Descending idx - recent items are worth processing first.
    NewestFirst,
}

/// What the runner does when a production fails hard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure and move on to the next item.
    ContinueRun,
    /// Terminate the stage (and the whole run) immediately. Used by the
    /// primary download stage to avoid hammering a failing source.
    AbortRun,
}

/// How artifact file names are derived from a catalog entry.
///
/// Two naming families exist: artifacts keyed by the opaque source id, and
/// human-stable names keyed by the dense index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactNaming {
    ById,
    ByIndex { prefix: String },
}

impl ArtifactNaming {
    /// File stem (no extension) for an entry.
    pub fn stem(&self, entry: &CatalogEntry) -> String {
        match self {
            ArtifactNaming::ById => entry.id.clone(),
            ArtifactNaming::ByIndex { prefix } => format!("{}_{:03}", prefix, entry.idx),
        }
    }
}

/// Outcome counters for one stage invocation.
#[derive(Debug, Clone, Default)]
pub struct StageReport {
    pub stage: String,
    pub produced: u32,
    pub skipped_existing: u32,
    pub skipped_unavailable: u32,
    pub failed: u32,
    /// The stage hit a hard failure under [`FailurePolicy::AbortRun`].
    pub aborted: bool,
    /// The per-run quota was exhausted before the catalog was.
    pub quota_reached: bool,
}

impl StageReport {
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            ..Self::default()
        }
    }
}

/// Item-level errors raised by stage producers.
#[derive(Debug, Error)]
pub enum StageError {
    /// The input the producer needs does not exist (upstream or locally).
    /// A soft skip: logged, not counted against the quota.
    #[error("source material unavailable: {0}")]
    Unavailable(String),

    /// The external collaborator failed.
    #[error("producer failed: {0}")]
    Producer(String),

    /// The quality gate rejected every attempt within the retry budget.
    /// Item-level fatal; the run continues with the next item.
    #[error("quality threshold not met after {attempts} attempts")]
    QualityThresholdUnmet { attempts: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UploadDate;

    fn entry(idx: u32, id: &str) -> CatalogEntry {
        CatalogEntry {
            idx,
            id: id.to_string(),
            title: "t".to_string(),
            url: "u".to_string(),
            date: UploadDate::Unknown,
        }
    }

    #[test]
    fn test_naming_by_id() {
        let naming = ArtifactNaming::ById;
        assert_eq!(naming.stem(&entry(7, "xyz123")), "xyz123");
    }

    #[test]
    fn test_naming_by_index_is_zero_padded() {
        let naming = ArtifactNaming::ByIndex {
            prefix: "track".to_string(),
        };
        assert_eq!(naming.stem(&entry(7, "xyz")), "track_007");
        assert_eq!(naming.stem(&entry(123, "xyz")), "track_123");
        assert_eq!(naming.stem(&entry(1234, "xyz")), "track_1234");
    }
}
