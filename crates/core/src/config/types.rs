use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::pages::PageOrder;
use crate::source::YtDlpConfig;
use crate::summarizer::LlmSummarizerConfig;
use crate::transcriber::WhisperConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub playlist: PlaylistConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub stages: StagesConfig,
    #[serde(default)]
    pub source: YtDlpConfig,
    #[serde(default)]
    pub transcriber: WhisperConfig,
    #[serde(default)]
    pub summarizer: LlmSummarizerConfig,
    #[serde(default)]
    pub docs: DocsConfig,
}

/// Which playlist to archive.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaylistConfig {
    pub url: String,
}

/// Where everything lives on disk.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,
    #[serde(default = "default_subtitle_dir")]
    pub subtitle_dir: PathBuf,
    #[serde(default = "default_notes_dir")]
    pub notes_dir: PathBuf,
    #[serde(default = "default_transcript_dir")]
    pub transcript_dir: PathBuf,
    #[serde(default = "default_summary_dir")]
    pub summary_dir: PathBuf,
    #[serde(default = "default_pages_dir")]
    pub pages_dir: PathBuf,
    /// Long-term archive directory; mirroring is skipped when unset.
    #[serde(default)]
    pub archive_dir: Option<PathBuf>,
    /// Prefix for index-derived artifact names (`<prefix>_001.mp3`, ...).
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            audio_dir: default_audio_dir(),
            subtitle_dir: default_subtitle_dir(),
            notes_dir: default_notes_dir(),
            transcript_dir: default_transcript_dir(),
            summary_dir: default_summary_dir(),
            pages_dir: default_pages_dir(),
            archive_dir: None,
            name_prefix: default_name_prefix(),
        }
    }
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/catalog.csv")
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("data/audio")
}

fn default_subtitle_dir() -> PathBuf {
    PathBuf::from("data/subtitle")
}

fn default_notes_dir() -> PathBuf {
    PathBuf::from("data/notes")
}

fn default_transcript_dir() -> PathBuf {
    PathBuf::from("data/transcript")
}

fn default_summary_dir() -> PathBuf {
    PathBuf::from("data/summary")
}

fn default_pages_dir() -> PathBuf {
    PathBuf::from("data/pages")
}

fn default_name_prefix() -> String {
    "item".to_string()
}

/// Per-stage quotas and knobs.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StagesConfig {
    #[serde(default)]
    pub dates: DateStageConfig,
    #[serde(default)]
    pub audio: AudioStageConfig,
    #[serde(default)]
    pub subtitle: SubtitleStageConfig,
    #[serde(default)]
    pub transcript: TranscriptStageConfig,
    #[serde(default)]
    pub summary: SummaryStageConfig,
}

/// Date resolution pass.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DateStageConfig {
    #[serde(default = "default_date_quota")]
    pub quota: u32,
}

impl Default for DateStageConfig {
    fn default() -> Self {
        Self {
            quota: default_date_quota(),
        }
    }
}

fn default_date_quota() -> u32 {
    10
}

/// Primary media download stage.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AudioStageConfig {
    #[serde(default = "default_audio_quota")]
    pub quota: u32,
    /// Pause between successful downloads.
    #[serde(default = "default_pause_secs")]
    pub pause_secs: u64,
    /// Accepted extensions; the first is the download target, the rest
    /// count as already present.
    #[serde(default = "default_audio_extensions")]
    pub extensions: Vec<String>,
}

impl Default for AudioStageConfig {
    fn default() -> Self {
        Self {
            quota: default_audio_quota(),
            pause_secs: default_pause_secs(),
            extensions: default_audio_extensions(),
        }
    }
}

fn default_audio_quota() -> u32 {
    5
}

fn default_pause_secs() -> u64 {
    5
}

fn default_audio_extensions() -> Vec<String> {
    vec!["mp3".to_string()]
}

/// Subtitle download stage.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubtitleStageConfig {
    #[serde(default = "default_subtitle_quota")]
    pub quota: u32,
    #[serde(default = "default_pause_secs")]
    pub pause_secs: u64,
    /// Subtitle language requested from the source.
    #[serde(default = "default_subtitle_language")]
    pub language: String,
}

impl Default for SubtitleStageConfig {
    fn default() -> Self {
        Self {
            quota: default_subtitle_quota(),
            pause_secs: default_pause_secs(),
            language: default_subtitle_language(),
        }
    }
}

fn default_subtitle_quota() -> u32 {
    5
}

fn default_subtitle_language() -> String {
    "ja".to_string()
}

/// Transcription stage.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscriptStageConfig {
    #[serde(default = "default_transcript_quota")]
    pub quota: u32,
}

impl Default for TranscriptStageConfig {
    fn default() -> Self {
        Self {
            quota: default_transcript_quota(),
        }
    }
}

fn default_transcript_quota() -> u32 {
    3
}

/// Summarization stage.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SummaryStageConfig {
    #[serde(default = "default_summary_quota")]
    pub quota: u32,
    /// Minimum target-script character ratio for an acceptable summary
    /// (boundary inclusive).
    #[serde(default = "default_min_density")]
    pub min_density: f64,
    /// Retry budget for the density gate.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for SummaryStageConfig {
    fn default() -> Self {
        Self {
            quota: default_summary_quota(),
            min_density: default_min_density(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_summary_quota() -> u32 {
    3
}

fn default_min_density() -> f64 {
    0.3
}

fn default_max_attempts() -> u32 {
    10
}

/// Document builder settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocsConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    #[serde(default)]
    pub order: PageOrder,
    #[serde(default = "default_docs_title")]
    pub title: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            order: PageOrder::default(),
            title: default_docs_title(),
        }
    }
}

fn default_batch_size() -> u32 {
    50
}

fn default_docs_title() -> String {
    "Archive".to_string()
}
