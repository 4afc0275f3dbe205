//! Subtitle download stage.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::catalog::CatalogEntry;
use crate::source::{MediaSource, SourceError};
use crate::stage::{
    scratch_path, ArtifactNaming, ArtifactStage, PresenceProbe, StageError, Traversal,
};

/// Downloads one subtitle track per item in a fixed language.
///
/// Not every item carries a subtitle in the requested language; that case
/// is a soft skip, distinct from a hard producer failure, and does not
/// consume the quota.
pub struct SubtitleStage {
    source: Arc<dyn MediaSource>,
    probe: PresenceProbe,
    naming: ArtifactNaming,
    language: String,
    quota: Option<u32>,
}

impl SubtitleStage {
    pub fn new(
        source: Arc<dyn MediaSource>,
        dir: impl Into<PathBuf>,
        naming: ArtifactNaming,
        language: impl Into<String>,
        quota: Option<u32>,
    ) -> Self {
        Self {
            source,
            probe: PresenceProbe::new(dir),
            naming,
            language: language.into(),
            quota,
        }
    }

    fn file_name(&self, entry: &CatalogEntry) -> String {
        format!("{}.srt", self.naming.stem(entry))
    }
}

#[async_trait]
impl ArtifactStage for SubtitleStage {
    fn name(&self) -> &str {
        "subtitle"
    }

    fn output_dir(&self) -> &Path {
        self.probe.dir()
    }

    fn traversal(&self) -> Traversal {
        Traversal::OldestFirst
    }

    fn quota(&self) -> Option<u32> {
        self.quota
    }

    fn exists(&self, entry: &CatalogEntry) -> bool {
        self.probe.exists(&self.file_name(entry))
    }

    async fn produce(&self, entry: &CatalogEntry) -> Result<(), StageError> {
        let target = self.probe.path(&self.file_name(entry));
        let scratch = scratch_path(&target);

        if scratch.exists() {
            tokio::fs::remove_file(&scratch).await?;
        }

        match self
            .source
            .fetch_subtitle(&entry.id, &self.language, &scratch)
            .await
        {
            Ok(()) => {
                tokio::fs::rename(&scratch, &target).await?;
                Ok(())
            }
            Err(SourceError::NotAvailable(reason)) => Err(StageError::Unavailable(reason)),
            Err(e) => Err(StageError::Producer(e.to_string())),
        }
    }
}
