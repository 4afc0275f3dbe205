//! Configuration: explicit, loaded once, passed into each component at
//! construction. No ambient path state anywhere else in the crate.

mod loader;
mod types;
mod validate;

pub use loader::{load_config, load_config_from_str};
pub use types::{
    AudioStageConfig, Config, DateStageConfig, DocsConfig, PlaylistConfig, StagesConfig,
    StorageConfig, SubtitleStageConfig, SummaryStageConfig, TranscriptStageConfig,
};
pub use validate::validate_config;

use thiserror::Error;

/// Errors for configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(String),

    #[error("failed to parse config: {0}")]
    ParseError(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}
