//! Mock media source for testing.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::catalog::{DiscoveredMedia, UploadDate};
use crate::source::{MediaSource, SourceError};

/// Mock implementation of the [`MediaSource`] trait.
///
/// Provides controllable behavior for testing:
/// - Configure the playlist returned by discovery
/// - Configure per-item upload dates and missing subtitles
/// - Inject per-item audio failures
/// - Record every fetch for assertions
///
/// Successful fetches write a small marker file to the destination path so
/// presence predicates behave like they would with real downloads.
#[derive(Clone, Default)]
pub struct MockMediaSource {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    playlist: Mutex<VecDeque<Vec<DiscoveredMedia>>>,
    default_playlist: Mutex<Vec<DiscoveredMedia>>,
    dates: Mutex<HashMap<String, UploadDate>>,
    missing_subtitles: Mutex<HashSet<String>>,
    failing_audio: Mutex<HashSet<String>>,
    failing_dates: Mutex<HashSet<String>>,
    audio_fetches: Mutex<Vec<String>>,
    subtitle_fetches: Mutex<Vec<String>>,
    date_lookups: Mutex<Vec<String>>,
}

impl MockMediaSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the playlist returned by every discovery call.
    pub fn set_playlist(&self, entries: Vec<DiscoveredMedia>) {
        *self.inner.default_playlist.lock().unwrap() = entries;
    }

    /// Queues a playlist for a single discovery call; once the queue is
    /// drained, the default playlist is returned again.
    pub fn push_playlist(&self, entries: Vec<DiscoveredMedia>) {
        self.inner.playlist.lock().unwrap().push_back(entries);
    }

    pub fn set_upload_date(&self, id: &str, date: UploadDate) {
        self.inner
            .dates
            .lock()
            .unwrap()
            .insert(id.to_string(), date);
    }

    /// Marks an item as having no subtitle in any language.
    pub fn set_subtitle_missing(&self, id: &str) {
        self.inner
            .missing_subtitles
            .lock()
            .unwrap()
            .insert(id.to_string());
    }

    /// Makes audio fetches for this item fail hard.
    pub fn fail_audio_for(&self, id: &str) {
        self.inner
            .failing_audio
            .lock()
            .unwrap()
            .insert(id.to_string());
    }

    /// Makes date lookups for this item fail hard.
    pub fn fail_date_for(&self, id: &str) {
        self.inner
            .failing_dates
            .lock()
            .unwrap()
            .insert(id.to_string());
    }

    pub fn recorded_audio_fetches(&self) -> Vec<String> {
        self.inner.audio_fetches.lock().unwrap().clone()
    }

    pub fn recorded_subtitle_fetches(&self) -> Vec<String> {
        self.inner.subtitle_fetches.lock().unwrap().clone()
    }

    pub fn recorded_date_lookups(&self) -> Vec<String> {
        self.inner.date_lookups.lock().unwrap().clone()
    }

    fn tool_failure(message: &str) -> SourceError {
        SourceError::ToolFailed {
            tool: "mock".to_string(),
            status: 1,
            stderr: message.to_string(),
        }
    }
}

#[async_trait]
impl MediaSource for MockMediaSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_playlist(
        &self,
        _playlist_url: &str,
    ) -> Result<Vec<DiscoveredMedia>, SourceError> {
        if let Some(queued) = self.inner.playlist.lock().unwrap().pop_front() {
            return Ok(queued);
        }
        Ok(self.inner.default_playlist.lock().unwrap().clone())
    }

    async fn resolve_upload_date(&self, media_id: &str) -> Result<UploadDate, SourceError> {
        self.inner
            .date_lookups
            .lock()
            .unwrap()
            .push(media_id.to_string());

        if self.inner.failing_dates.lock().unwrap().contains(media_id) {
            return Err(Self::tool_failure("injected date failure"));
        }
        Ok(self
            .inner
            .dates
            .lock()
            .unwrap()
            .get(media_id)
            .copied()
            .unwrap_or(UploadDate::Unknown))
    }

    async fn fetch_audio(&self, media_id: &str, dest: &Path) -> Result<(), SourceError> {
        self.inner
            .audio_fetches
            .lock()
            .unwrap()
            .push(media_id.to_string());

        if self.inner.failing_audio.lock().unwrap().contains(media_id) {
            return Err(Self::tool_failure("injected audio failure"));
        }
        tokio::fs::write(dest, format!("audio:{media_id}")).await?;
        Ok(())
    }

    async fn fetch_subtitle(
        &self,
        media_id: &str,
        language: &str,
        dest: &Path,
    ) -> Result<(), SourceError> {
        self.inner
            .subtitle_fetches
            .lock()
            .unwrap()
            .push(media_id.to_string());

        if self
            .inner
            .missing_subtitles
            .lock()
            .unwrap()
            .contains(media_id)
        {
            return Err(SourceError::NotAvailable(format!(
                "no {language} subtitle for {media_id}"
            )));
        }
        tokio::fs::write(dest, format!("subtitle:{media_id}:{language}")).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fetch_audio_writes_marker() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("a.mp3");
        let source = MockMediaSource::new();

        source.fetch_audio("abc", &dest).await.unwrap();
        assert_eq!(
            tokio::fs::read_to_string(&dest).await.unwrap(),
            "audio:abc"
        );
        assert_eq!(source.recorded_audio_fetches(), vec!["abc"]);
    }

    #[tokio::test]
    async fn test_injected_audio_failure() {
        let temp = TempDir::new().unwrap();
        let source = MockMediaSource::new();
        source.fail_audio_for("abc");

        let err = source
            .fetch_audio("abc", &temp.path().join("a.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::ToolFailed { .. }));
    }

    #[tokio::test]
    async fn test_queued_playlist_takes_precedence_once() {
        let source = MockMediaSource::new();
        source.push_playlist(vec![DiscoveredMedia {
            id: "queued".to_string(),
            title: "q".to_string(),
            duration_secs: Some(1),
            upload_date: UploadDate::Unknown,
        }]);

        let first = source.list_playlist("url").await.unwrap();
        assert_eq!(first.len(), 1);
        let second = source.list_playlist("url").await.unwrap();
        assert!(second.is_empty());
    }
}
