//! Primary media download stage.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::catalog::CatalogEntry;
use crate::source::MediaSource;
use crate::stage::{
    scratch_path, ArtifactNaming, ArtifactStage, FailurePolicy, PresenceProbe, StageError,
    Traversal,
};

/// Downloads each item's audio track.
///
/// This is the stage that actually hits the upstream media service, so it
/// is the strictest one: a fixed pause between successful downloads (via
/// the runner's pacer) and abort-on-first-failure so a broken source is
/// not hammered across the rest of the catalog.
pub struct AudioStage {
    source: Arc<dyn MediaSource>,
    probe: PresenceProbe,
    naming: ArtifactNaming,
    /// Accepted extensions; the first one is the download target, the rest
    /// are legacy formats still counting as present.
    extensions: Vec<String>,
    quota: Option<u32>,
}

impl AudioStage {
    pub fn new(
        source: Arc<dyn MediaSource>,
        dir: impl Into<PathBuf>,
        naming: ArtifactNaming,
        extensions: Vec<String>,
        quota: Option<u32>,
    ) -> Self {
        Self {
            source,
            probe: PresenceProbe::new(dir),
            naming,
            extensions,
            quota,
        }
    }

    fn target_path(&self, entry: &CatalogEntry) -> PathBuf {
        let ext = self.extensions.first().map(String::as_str).unwrap_or("mp3");
        self.probe.path(&format!("{}.{ext}", self.naming.stem(entry)))
    }
}

#[async_trait]
impl ArtifactStage for AudioStage {
    fn name(&self) -> &str {
        "audio"
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

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::AbortRun
    }

    fn exists(&self, entry: &CatalogEntry) -> bool {
        self.probe
            .exists_any(&self.naming.stem(entry), &self.extensions)
    }

    async fn produce(&self, entry: &CatalogEntry) -> Result<(), StageError> {
        let target = self.target_path(entry);
        let scratch = scratch_path(&target);

        // A stale scratch file from an interrupted run must go before the
        // new download starts.
        if scratch.exists() {
            tokio::fs::remove_file(&scratch).await?;
        }

        self.source
            .fetch_audio(&entry.id, &scratch)
            .await
            .map_err(|e| StageError::Producer(e.to_string()))?;

        tokio::fs::rename(&scratch, &target).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UploadDate;
    use crate::testing::MockMediaSource;
    use tempfile::TempDir;

    fn entry(idx: u32, id: &str) -> CatalogEntry {
        CatalogEntry {
            idx,
            id: id.to_string(),
            title: "t".to_string(),
            url: "u".to_string(),
            date: UploadDate::Unknown,
        }
    }

    fn stage(source: Arc<dyn MediaSource>, dir: &TempDir) -> AudioStage {
        AudioStage::new(
            source,
            dir.path(),
            ArtifactNaming::ByIndex {
                prefix: "track".to_string(),
            },
            vec!["mp3".to_string(), "m4a".to_string()],
            Some(5),
        )
    }

    #[tokio::test]
    async fn test_produce_lands_final_file() {
        let temp = TempDir::new().unwrap();
        let source = Arc::new(MockMediaSource::new());
        let stage = stage(source, &temp);
        let entry = entry(3, "abc");

        assert!(!stage.exists(&entry));
        stage.produce(&entry).await.unwrap();

        let target = temp.path().join("track_003.mp3");
        assert!(target.exists());
        assert!(!scratch_path(&target).exists());
        assert!(stage.exists(&entry));
    }

    #[tokio::test]
    async fn test_legacy_extension_counts_as_present() {
        let temp = TempDir::new().unwrap();
        tokio::fs::write(temp.path().join("track_001.m4a"), "x")
            .await
            .unwrap();

        let source = Arc::new(MockMediaSource::new());
        let stage = stage(source, &temp);
        assert!(stage.exists(&entry(1, "abc")));
    }

    #[tokio::test]
    async fn test_failed_fetch_is_producer_error() {
        let temp = TempDir::new().unwrap();
        let source = MockMediaSource::new();
        source.fail_audio_for("abc");
        let stage = stage(Arc::new(source), &temp);

        let err = stage.produce(&entry(1, "abc")).await.unwrap_err();
        assert!(matches!(err, StageError::Producer(_)));
        assert!(!stage.exists(&entry(1, "abc")));
    }

    #[tokio::test]
    async fn test_stale_scratch_file_is_replaced() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("track_001.mp3");
        tokio::fs::write(scratch_path(&target), "torso")
            .await
            .unwrap();

        let source = Arc::new(MockMediaSource::new());
        let stage = stage(source, &temp);
        stage.produce(&entry(1, "abc")).await.unwrap();

        assert!(target.exists());
        assert_ne!(
            tokio::fs::read_to_string(&target).await.unwrap(),
            "torso"
        );
    }
}
