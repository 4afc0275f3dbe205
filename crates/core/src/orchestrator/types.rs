//! Types for the end-to-end pipeline run.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::mirror::{MirrorError, MirrorReport};
use crate::source::SourceError;
use crate::stage::{StageError, StageReport};

/// Outcome of one full pipeline run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Items the source listed this run (after the duration filter).
    pub discovered: usize,
    /// Items newly added to the catalog.
    pub added: usize,
    /// Upload dates resolved this run.
    pub dates_resolved: u32,
    /// One report per stage that ran, in execution order.
    pub stages: Vec<StageReport>,
    /// Listing pages written by the document builder.
    pub pages_written: u32,
    /// Mirror outcome; `None` when no archive directory is configured or
    /// the run aborted before mirroring.
    pub mirror: Option<MirrorReport>,
    /// The primary download stage hit its abort-on-failure policy and the
    /// rest of the run was skipped.
    pub aborted: bool,
}

/// Run-level fatal errors.
///
/// Item-level trouble never shows up here; it is logged and counted in the
/// stage reports. These are the failures that make continuing pointless:
/// a corrupt or unwritable catalog, an unlistable playlist, an unusable
/// output or archive directory.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("playlist listing failed: {0}")]
    Listing(#[from] SourceError),

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Mirror(#[from] MirrorError),

    #[error("document build failed: {0}")]
    Docs(#[from] std::io::Error),
}
