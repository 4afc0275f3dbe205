//! Transcription stage.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::catalog::CatalogEntry;
use crate::stage::{
    write_atomic, ArtifactNaming, ArtifactStage, PresenceProbe, StageError, Traversal,
};
use crate::transcriber::Transcriber;

/// Runs the transcription collaborator over already-downloaded audio.
///
/// Walks newest-first: fresh uploads are the ones worth reading soonest.
/// Items whose audio has not been downloaded yet are soft-skipped; the
/// audio stage will catch them up on a later run.
pub struct TranscriptStage {
    transcriber: Arc<dyn Transcriber>,
    audio_probe: PresenceProbe,
    audio_naming: ArtifactNaming,
    audio_extensions: Vec<String>,
    probe: PresenceProbe,
    quota: Option<u32>,
}

impl TranscriptStage {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        audio_dir: impl Into<PathBuf>,
        audio_naming: ArtifactNaming,
        audio_extensions: Vec<String>,
        dir: impl Into<PathBuf>,
        quota: Option<u32>,
    ) -> Self {
        Self {
            transcriber,
            audio_probe: PresenceProbe::new(audio_dir),
            audio_naming,
            audio_extensions,
            probe: PresenceProbe::new(dir),
            quota,
        }
    }

    fn file_name(entry: &CatalogEntry) -> String {
        format!("{}.txt", entry.id)
    }
}

#[async_trait]
impl ArtifactStage for TranscriptStage {
    fn name(&self) -> &str {
        "transcript"
    }

    fn output_dir(&self) -> &Path {
        self.probe.dir()
    }

    fn traversal(&self) -> Traversal {
        Traversal::NewestFirst
    }

    fn quota(&self) -> Option<u32> {
        self.quota
    }

    fn exists(&self, entry: &CatalogEntry) -> bool {
        self.probe.exists(&Self::file_name(entry))
    }

    async fn produce(&self, entry: &CatalogEntry) -> Result<(), StageError> {
        let stem = self.audio_naming.stem(entry);
        let Some(audio) = self
            .audio_probe
            .first_existing(&stem, &self.audio_extensions)
        else {
            return Err(StageError::Unavailable(format!(
                "audio for {stem} not downloaded yet"
            )));
        };

        let text = self
            .transcriber
            .transcribe(&audio)
            .await
            .map_err(|e| StageError::Producer(e.to_string()))?;

        let target = self.probe.path(&Self::file_name(entry));
        write_atomic(&target, text.as_bytes()).await?;
        Ok(())
    }
}
