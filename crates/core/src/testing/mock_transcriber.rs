//! Mock transcriber for testing.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::transcriber::{Transcriber, TranscriberError};

/// Mock implementation of the [`Transcriber`] trait.
///
/// Returns a configurable text for every audio file, records calls, and
/// supports one-shot error injection.
#[derive(Clone)]
pub struct MockTranscriber {
    inner: Arc<Inner>,
}

struct Inner {
    text: Mutex<String>,
    fail_next: Mutex<bool>,
    calls: Mutex<Vec<PathBuf>>,
}

impl Default for MockTranscriber {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranscriber {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                text: Mutex::new("transcribed speech".to_string()),
                fail_next: Mutex::new(false),
                calls: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Sets the text returned for every transcription.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        *self.inner.text.lock().unwrap() = text.into();
        self
    }

    /// Makes the next transcription fail.
    pub fn set_fail_next(&self) {
        *self.inner.fail_next.lock().unwrap() = true;
    }

    pub fn recorded_calls(&self) -> Vec<PathBuf> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transcribe(&self, audio: &Path) -> Result<String, TranscriberError> {
        self.inner.calls.lock().unwrap().push(audio.to_path_buf());

        if std::mem::take(&mut *self.inner.fail_next.lock().unwrap()) {
            return Err(TranscriberError::ToolFailed {
                tool: "mock".to_string(),
                status: 1,
                stderr: "injected failure".to_string(),
            });
        }
        Ok(self.inner.text.lock().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_configured_text() {
        let transcriber = MockTranscriber::new().with_text("hello");
        let text = transcriber.transcribe(Path::new("/a.mp3")).await.unwrap();
        assert_eq!(text, "hello");
        assert_eq!(transcriber.call_count(), 1);
    }

    #[tokio::test]
    async fn test_error_injection_is_one_shot() {
        let transcriber = MockTranscriber::new();
        transcriber.set_fail_next();

        assert!(transcriber.transcribe(Path::new("/a.mp3")).await.is_err());
        assert!(transcriber.transcribe(Path::new("/a.mp3")).await.is_ok());
    }
}
