use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tapedeck_core::{
    load_config, validate_config, LlmSummarizer, MediaSource, PipelineRunner, Summarizer,
    Transcriber, WhisperTranscriber, YtDlpSource,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("TAPEDECK_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("tapedeck {} starting", VERSION);
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Playlist: {}", config.playlist.url);
    info!("Catalog path: {:?}", config.storage.catalog_path);

    // Wire up the external collaborators
    let source: Arc<dyn MediaSource> = Arc::new(YtDlpSource::new(config.source.clone()));
    let transcriber: Arc<dyn Transcriber> =
        Arc::new(WhisperTranscriber::new(config.transcriber.clone()));
    let summarizer: Arc<dyn Summarizer> =
        Arc::new(LlmSummarizer::new(config.summarizer.clone()));

    // One bounded, resumable pass over the whole pipeline
    let runner = PipelineRunner::new(config, source, transcriber, summarizer);
    let summary = runner.run().await.context("Pipeline run failed")?;

    for report in &summary.stages {
        info!(
            stage = %report.stage,
            produced = report.produced,
            skipped_existing = report.skipped_existing,
            skipped_unavailable = report.skipped_unavailable,
            failed = report.failed,
            "stage summary"
        );
    }
    if let Some(ref mirror) = summary.mirror {
        info!(
            copied = mirror.copied,
            skipped_existing = mirror.skipped_existing,
            failed = mirror.failed,
            "mirror summary"
        );
    }

    if summary.aborted {
        warn!("Run aborted by the primary download stage; next run will retry");
    } else {
        info!(
            "Run complete: {} discovered, {} added, {} dates resolved, {} pages",
            summary.discovered, summary.added, summary.dates_resolved, summary.pages_written
        );
    }

    Ok(())
}
