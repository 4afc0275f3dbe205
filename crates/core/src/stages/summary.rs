//! Summarization stage.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::catalog::CatalogEntry;
use crate::stage::{
    retry_until, write_atomic, ArtifactStage, PresenceProbe, RetryError, StageError, Traversal,
};
use crate::summarizer::{han_ratio, Summarizer};

/// Summarizes transcripts through the summarization collaborator.
///
/// The model's output is gated by the script-density check: a summary is
/// accepted only when its Han-character ratio reaches the configured
/// threshold (boundary inclusive). Rejections are retried up to the
/// attempt budget; exhausting it fails that item and the run moves on.
pub struct SummaryStage {
    summarizer: Arc<dyn Summarizer>,
    transcript_probe: PresenceProbe,
    probe: PresenceProbe,
    min_density: f64,
    max_attempts: u32,
    quota: Option<u32>,
}

impl SummaryStage {
    pub fn new(
        summarizer: Arc<dyn Summarizer>,
        transcript_dir: impl Into<PathBuf>,
        dir: impl Into<PathBuf>,
        min_density: f64,
        max_attempts: u32,
        quota: Option<u32>,
    ) -> Self {
        Self {
            summarizer,
            transcript_probe: PresenceProbe::new(transcript_dir),
            probe: PresenceProbe::new(dir),
            min_density,
            max_attempts,
            quota,
        }
    }

    fn file_name(entry: &CatalogEntry) -> String {
        format!("{}.md", entry.id)
    }
}

#[async_trait]
impl ArtifactStage for SummaryStage {
    fn name(&self) -> &str {
        "summary"
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
        let transcript_path = self.transcript_probe.path(&format!("{}.txt", entry.id));
        if !transcript_path.exists() {
            return Err(StageError::Unavailable(format!(
                "transcript for {} not produced yet",
                entry.id
            )));
        }
        let transcript = tokio::fs::read_to_string(&transcript_path).await?;

        let summary = retry_until(
            self.max_attempts,
            |_attempt| self.summarizer.summarize(&transcript),
            |text| han_ratio(text) >= self.min_density,
        )
        .await
        .map_err(|e| match e {
            RetryError::Exhausted { attempts } => StageError::QualityThresholdUnmet { attempts },
            RetryError::Inner(inner) => StageError::Producer(inner.to_string()),
        })?;

        let target = self.probe.path(&Self::file_name(entry));
        write_atomic(&target, summary.as_bytes()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UploadDate;
    use crate::testing::MockSummarizer;
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

    async fn with_transcript(dir: &TempDir, id: &str) {
        tokio::fs::write(dir.path().join(format!("{id}.txt")), "transcript body")
            .await
            .unwrap();
    }

    fn stage(
        summarizer: Arc<dyn Summarizer>,
        transcript_dir: &TempDir,
        out_dir: &TempDir,
    ) -> SummaryStage {
        SummaryStage::new(
            summarizer,
            transcript_dir.path(),
            out_dir.path(),
            0.3,
            10,
            Some(3),
        )
    }

    #[tokio::test]
    async fn test_missing_transcript_is_unavailable() {
        let transcripts = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let stage = stage(Arc::new(MockSummarizer::new()), &transcripts, &out);

        let err = stage.produce(&entry(1, "abc")).await.unwrap_err();
        assert!(matches!(err, StageError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_dense_summary_is_accepted_first_try() {
        let transcripts = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        with_transcript(&transcripts, "abc").await;

        let summarizer = MockSummarizer::new().with_response("這是一段摘要");
        let stage = stage(Arc::new(summarizer.clone()), &transcripts, &out);

        stage.produce(&entry(1, "abc")).await.unwrap();
        assert_eq!(summarizer.call_count(), 1);
        assert!(out.path().join("abc.md").exists());
    }

    #[tokio::test]
    async fn test_low_density_retries_then_succeeds() {
        let transcripts = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        with_transcript(&transcripts, "abc").await;

        let summarizer = MockSummarizer::new();
        summarizer.push_response("all english, rejected");
        summarizer.push_response("also english, rejected");
        summarizer.push_response("終於是中文摘要了");
        let stage = stage(Arc::new(summarizer.clone()), &transcripts, &out);

        stage.produce(&entry(1, "abc")).await.unwrap();
        assert_eq!(summarizer.call_count(), 3);

        let body = tokio::fs::read_to_string(out.path().join("abc.md"))
            .await
            .unwrap();
        assert_eq!(body, "終於是中文摘要了");
    }

    #[tokio::test]
    async fn test_exhausted_budget_is_quality_threshold_unmet() {
        let transcripts = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        with_transcript(&transcripts, "abc").await;

        let summarizer = MockSummarizer::new().with_response("never chinese");
        let stage = stage(Arc::new(summarizer.clone()), &transcripts, &out);

        let err = stage.produce(&entry(1, "abc")).await.unwrap_err();
        assert!(matches!(
            err,
            StageError::QualityThresholdUnmet { attempts: 10 }
        ));
        assert_eq!(summarizer.call_count(), 10);
        assert!(!out.path().join("abc.md").exists());
    }

    #[tokio::test]
    async fn test_density_exactly_at_threshold_is_accepted() {
        let transcripts = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        with_transcript(&transcripts, "abc").await;

        // 3 Han characters out of 10 non-whitespace: exactly 0.3.
        let boundary = "摘要文abcdefg";
        assert!((han_ratio(boundary) - 0.3).abs() < f64::EPSILON);

        let summarizer = MockSummarizer::new().with_response(boundary);
        let stage = stage(Arc::new(summarizer.clone()), &transcripts, &out);

        stage.produce(&entry(1, "abc")).await.unwrap();
        assert_eq!(summarizer.call_count(), 1);
    }
}
