//! Mock summarizer for testing.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::summarizer::{Summarizer, SummarizerError};

/// Mock implementation of the [`Summarizer`] trait.
///
/// Responses can be queued to script a sequence (useful for exercising the
/// density-gated retry loop); once the queue is drained the default
/// response repeats. The default is Han-dense so pipelines pass the
/// density gate unless a test says otherwise.
#[derive(Clone)]
pub struct MockSummarizer {
    inner: Arc<Inner>,
}

struct Inner {
    queue: Mutex<VecDeque<String>>,
    default_response: Mutex<String>,
    fail_next: Mutex<bool>,
    calls: Mutex<u32>,
}

impl Default for MockSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSummarizer {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                queue: Mutex::new(VecDeque::new()),
                default_response: Mutex::new("這是影片內容的重點摘要。".to_string()),
                fail_next: Mutex::new(false),
                calls: Mutex::new(0),
            }),
        }
    }

    /// Sets the default response returned once the queue is drained.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        *self.inner.default_response.lock().unwrap() = response.into();
        self
    }

    /// Queues a one-shot response.
    pub fn push_response(&self, response: impl Into<String>) {
        self.inner.queue.lock().unwrap().push_back(response.into());
    }

    /// Makes the next summarization fail.
    pub fn set_fail_next(&self) {
        *self.inner.fail_next.lock().unwrap() = true;
    }

    pub fn call_count(&self) -> u32 {
        *self.inner.calls.lock().unwrap()
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn summarize(&self, _transcript: &str) -> Result<String, SummarizerError> {
        *self.inner.calls.lock().unwrap() += 1;

        if std::mem::take(&mut *self.inner.fail_next.lock().unwrap()) {
            return Err(SummarizerError::Http("injected failure".to_string()));
        }

        if let Some(queued) = self.inner.queue.lock().unwrap().pop_front() {
            return Ok(queued);
        }
        Ok(self.inner.default_response.lock().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queue_then_default() {
        let summarizer = MockSummarizer::new().with_response("default");
        summarizer.push_response("first");

        assert_eq!(summarizer.summarize("t").await.unwrap(), "first");
        assert_eq!(summarizer.summarize("t").await.unwrap(), "default");
        assert_eq!(summarizer.call_count(), 2);
    }

    #[tokio::test]
    async fn test_error_injection_is_one_shot() {
        let summarizer = MockSummarizer::new();
        summarizer.set_fail_next();

        assert!(summarizer.summarize("t").await.is_err());
        assert!(summarizer.summarize("t").await.is_ok());
    }
}
