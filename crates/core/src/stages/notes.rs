//! Note creation stage.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::catalog::CatalogEntry;
use crate::stage::{
    write_atomic, ArtifactNaming, ArtifactStage, PresenceProbe, StageError, Traversal,
};

/// Writes a small note file per item holding its canonical URL.
///
/// Pure local writes, so the stage runs unconditionally over the full
/// catalog with no quota.
pub struct NotesStage {
    probe: PresenceProbe,
    naming: ArtifactNaming,
}

impl NotesStage {
    pub fn new(dir: impl Into<PathBuf>, naming: ArtifactNaming) -> Self {
        Self {
            probe: PresenceProbe::new(dir),
            naming,
        }
    }

    fn file_name(&self, entry: &CatalogEntry) -> String {
        format!("{}.notes.txt", self.naming.stem(entry))
    }
}

#[async_trait]
impl ArtifactStage for NotesStage {
    fn name(&self) -> &str {
        "notes"
    }

    fn output_dir(&self) -> &Path {
        self.probe.dir()
    }

    fn traversal(&self) -> Traversal {
        Traversal::OldestFirst
    }

    fn exists(&self, entry: &CatalogEntry) -> bool {
        self.probe.exists(&self.file_name(entry))
    }

    async fn produce(&self, entry: &CatalogEntry) -> Result<(), StageError> {
        let target = self.probe.path(&self.file_name(entry));
        write_atomic(&target, entry.url.as_bytes()).await?;
        Ok(())
    }
}
