//! The transcription collaborator (audio in, text out).

mod whisper;

pub use whisper::{WhisperConfig, WhisperTranscriber};

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the transcription collaborator.
#[derive(Debug, Error)]
pub enum TranscriberError {
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

    #[error("expected transcript output missing: {0}")]
    MissingOutput(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Opaque speech-to-text seam.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Returns the name of this transcriber implementation.
    fn name(&self) -> &str;

    /// Transcribes one audio file into plain text.
    async fn transcribe(&self, audio: &Path) -> Result<String, TranscriberError>;
}
