//! The media source collaborator.
//!
//! Everything that talks to the upstream video service lives behind the
//! [`MediaSource`] trait: playlist listing, upload-date lookup, and the
//! actual audio/subtitle downloads. The pipeline treats all of it as an
//! opaque service that either delivers bytes/metadata or fails.

mod ytdlp;

pub use ytdlp::{YtDlpConfig, YtDlpSource};

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::{DiscoveredMedia, UploadDate};

/// Errors from the media source collaborator.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The requested artifact does not exist upstream (e.g. no subtitle in
    /// the requested language). Recoverable; callers skip the item.
    #[error("not available: {0}")]
    NotAvailable(String),

    #[error("{tool} not found at {path}")]
    ToolNotFound { tool: String, path: String },

    #[error("{tool} exited with status {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: i32,
        stderr: String,
    },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected output: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Upstream video service seam.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Returns the name of this source implementation.
    fn name(&self) -> &str;

    /// Lists a playlist, excluding entries with an unset duration or a
    /// duration above the configured ceiling (presumed live broadcasts or
    /// unusually long items) before they ever reach the catalog store.
    async fn list_playlist(&self, playlist_url: &str)
        -> Result<Vec<DiscoveredMedia>, SourceError>;

    /// Looks up the upload date of a single item. Returning
    /// [`UploadDate::Unknown`] is not an error; it means the service could
    /// not tell.
    async fn resolve_upload_date(&self, media_id: &str) -> Result<UploadDate, SourceError>;

    /// Downloads the item's audio into `dest`.
    async fn fetch_audio(&self, media_id: &str, dest: &Path) -> Result<(), SourceError>;

    /// Downloads a subtitle track in `language` into `dest`. Returns
    /// [`SourceError::NotAvailable`] when the item has no subtitle in that
    /// language.
    async fn fetch_subtitle(
        &self,
        media_id: &str,
        language: &str,
        dest: &Path,
    ) -> Result<(), SourceError>;
}
