pub mod catalog;
pub mod config;
pub mod mirror;
pub mod orchestrator;
pub mod pages;
pub mod source;
pub mod stage;
pub mod stages;
pub mod summarizer;
pub mod testing;
pub mod transcriber;

pub use catalog::{Catalog, CatalogEntry, CatalogError, CatalogStore, DiscoveredMedia, UploadDate};
pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use mirror::{ArchiveMirror, MirrorError, MirrorReport};
pub use orchestrator::{PipelineRunner, RunError, RunSummary};
pub use pages::{paginate, DocumentBuilder, Page, PageOrder};
pub use source::{MediaSource, SourceError, YtDlpConfig, YtDlpSource};
pub use stage::{
    ArtifactNaming, ArtifactStage, FailurePolicy, Pacer, StageError, StageReport, StageRunner,
    Traversal,
};
pub use stages::{AudioStage, NotesStage, SubtitleStage, SummaryStage, TranscriptStage};
pub use summarizer::{LlmSummarizer, LlmSummarizerConfig, Summarizer, SummarizerError};
pub use transcriber::{Transcriber, TranscriberError, WhisperConfig, WhisperTranscriber};
