//! The summarization collaborator (transcript text in, summary text out).

mod density;
mod llm;

pub use density::han_ratio;
pub use llm::{LlmSummarizer, LlmSummarizerConfig};

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the summarization collaborator.
#[derive(Debug, Error)]
pub enum SummarizerError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Opaque text-summarization seam.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Returns the name of this summarizer implementation.
    fn name(&self) -> &str;

    /// Produces a summary of the given transcript.
    ///
    /// The output is not trusted: callers gate it through the
    /// script-density check and retry on rejection.
    async fn summarize(&self, transcript: &str) -> Result<String, SummarizerError>;
}
