//! LLM-backed summarizer implementation (Ollama-style HTTP API).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::Duration;
use tracing::debug;

use super::{Summarizer, SummarizerError};

/// Configuration for the LLM summarizer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmSummarizerConfig {
    /// Base URL of the generation API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,
    /// Instruction prepended to the transcript.
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmSummarizerConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            prompt: default_prompt(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_base() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "qwen2.5:7b".to_string()
}

fn default_prompt() -> String {
    "請用繁體中文為以下逐字稿撰寫重點摘要：".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

/// Summarizer backed by a local LLM serving the Ollama generate API.
pub struct LlmSummarizer {
    client: reqwest::Client,
    config: LlmSummarizerConfig,
}

impl LlmSummarizer {
    pub fn new(config: LlmSummarizerConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(LlmSummarizerConfig::default())
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    fn name(&self) -> &str {
        "llm"
    }

    async fn summarize(&self, transcript: &str) -> Result<String, SummarizerError> {
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: format!("{}\n\n{}", self.config.prompt, transcript),
            stream: false,
        };

        debug!(model = %self.config.model, chars = transcript.len(), "requesting summary");

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let response = self
            .client
            .post(format!("{}/api/generate", self.config.api_base))
            .timeout(timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SummarizerError::Timeout(timeout)
                } else {
                    SummarizerError::Http(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SummarizerError::Http(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(SummarizerError::Api {
                status,
                message: body,
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| SummarizerError::Json(e.to_string()))?;
        Ok(parsed.response.trim().to_string())
    }
}
