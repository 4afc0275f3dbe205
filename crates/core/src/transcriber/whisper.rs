//! Whisper CLI based transcriber implementation.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::{Transcriber, TranscriberError};

/// Configuration for the whisper collaborator.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WhisperConfig {
    /// Path to the whisper binary.
    #[serde(default = "default_binary_path")]
    pub binary_path: String,
    /// Model name passed to `--model`.
    #[serde(default = "default_model")]
    pub model: String,
    /// Spoken language hint; autodetected when unset.
    #[serde(default)]
    pub language: Option<String>,
    /// Directory whisper writes its text output into before we read it
    /// back.
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,
    /// Per-invocation timeout. Transcription is slow; be generous.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            binary_path: default_binary_path(),
            model: default_model(),
            language: None,
            scratch_dir: default_scratch_dir(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_binary_path() -> String {
    "whisper".to_string()
}

fn default_model() -> String {
    "small".to_string()
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir().join("tapedeck-whisper")
}

fn default_timeout_secs() -> u64 {
    3600
}

/// Transcriber backed by the whisper command line tool.
pub struct WhisperTranscriber {
    config: WhisperConfig,
}

impl WhisperTranscriber {
    pub fn new(config: WhisperConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(WhisperConfig::default())
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    fn name(&self) -> &str {
        "whisper"
    }

    async fn transcribe(&self, audio: &Path) -> Result<String, TranscriberError> {
        tokio::fs::create_dir_all(&self.config.scratch_dir).await?;

        let mut args = vec![
            audio.to_string_lossy().to_string(),
            "--model".to_string(),
            self.config.model.clone(),
            "--output_format".to_string(),
            "txt".to_string(),
            "--output_dir".to_string(),
            self.config.scratch_dir.to_string_lossy().to_string(),
        ];
        if let Some(ref language) = self.config.language {
            args.extend(["--language".to_string(), language.clone()]);
        }

        debug!(binary = %self.config.binary_path, audio = %audio.display(), "invoking whisper");

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let output = timeout(timeout_duration, async {
            Command::new(&self.config.binary_path)
                .args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::piped())
                .output()
                .await
                .map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        TranscriberError::ToolNotFound {
                            tool: "whisper".to_string(),
                            path: self.config.binary_path.clone(),
                        }
                    } else {
                        TranscriberError::Io(e)
                    }
                })
        })
        .await
        .map_err(|_| TranscriberError::Timeout(timeout_duration))??;

        if !output.status.success() {
            return Err(TranscriberError::ToolFailed {
                tool: "whisper".to_string(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // Whisper names the transcript after the audio file's stem.
        let stem = audio
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let transcript_path = self.config.scratch_dir.join(format!("{stem}.txt"));
        if !transcript_path.exists() {
            return Err(TranscriberError::MissingOutput(transcript_path));
        }

        let text = tokio::fs::read_to_string(&transcript_path).await?;
        let _ = tokio::fs::remove_file(&transcript_path).await;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_tool_not_found() {
        let transcriber = WhisperTranscriber::new(WhisperConfig {
            binary_path: "/nonexistent/whisper".to_string(),
            scratch_dir: std::env::temp_dir().join("tapedeck-whisper-test"),
            ..WhisperConfig::default()
        });

        let err = transcriber
            .transcribe(Path::new("/tmp/audio.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranscriberError::ToolNotFound { .. }));
    }
}
