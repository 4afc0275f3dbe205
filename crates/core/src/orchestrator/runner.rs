//! The sequential end-to-end pipeline run.
//!
//! One invocation does one bounded pass: sync the catalog with the
//! playlist, resolve a few upload dates, give every artifact stage its
//! quota, rebuild the listing documents, and mirror new artifacts into
//! the archive. Every step is idempotent, so the whole run can be
//! re-invoked on a schedule and simply continues where the last run
//! stopped.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::catalog::CatalogStore;
use crate::config::Config;
use crate::mirror::ArchiveMirror;
use crate::pages::DocumentBuilder;
use crate::source::MediaSource;
use crate::stage::{ArtifactNaming, Pacer, StageRunner};
use crate::stages::{AudioStage, NotesStage, SubtitleStage, SummaryStage, TranscriptStage};
use crate::summarizer::Summarizer;
use crate::transcriber::Transcriber;

use super::types::{RunError, RunSummary};

/// Drives the whole pipeline, strictly sequentially.
pub struct PipelineRunner {
    config: Config,
    source: Arc<dyn MediaSource>,
    transcriber: Arc<dyn Transcriber>,
    summarizer: Arc<dyn Summarizer>,
}

impl PipelineRunner {
    pub fn new(
        config: Config,
        source: Arc<dyn MediaSource>,
        transcriber: Arc<dyn Transcriber>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            config,
            source,
            transcriber,
            summarizer,
        }
    }

    fn index_naming(&self) -> ArtifactNaming {
        ArtifactNaming::ByIndex {
            prefix: self.config.storage.name_prefix.clone(),
        }
    }

    /// Runs one full pass.
    pub async fn run(&self) -> Result<RunSummary, RunError> {
        let storage = &self.config.storage;
        let stages = &self.config.stages;
        let mut summary = RunSummary::default();

        // Catalog sync: load, merge fresh discoveries, persist if grown.
        let store = CatalogStore::new(&storage.catalog_path);
        let mut catalog = store.load().await?;
        info!(entries = catalog.len(), "catalog loaded");

        let discovered = self.source.list_playlist(&self.config.playlist.url).await?;
        summary.discovered = discovered.len();

        let added = catalog.merge_discovered(discovered);
        summary.added = added.len();
        if added.is_empty() {
            info!("no new items in playlist");
        } else {
            store.save(&catalog).await?;
            info!(added = added.len(), total = catalog.len(), "catalog extended");
        }

        summary.dates_resolved = store
            .resolve_dates(&mut catalog, self.source.as_ref(), stages.dates.quota)
            .await?;

        // Artifact stages, each with its own quota and pacing.
        let naming = self.index_naming();
        let audio_extensions = stages.audio.extensions.clone();

        let audio = AudioStage::new(
            Arc::clone(&self.source),
            &storage.audio_dir,
            naming.clone(),
            audio_extensions.clone(),
            Some(stages.audio.quota),
        );
        let report = StageRunner::new(Pacer::fixed(Duration::from_secs(stages.audio.pause_secs)))
            .run(&audio, &catalog)
            .await?;
        let aborted = report.aborted;
        summary.stages.push(report);

        if aborted {
            // The source is misbehaving; do not touch it again this run.
            warn!("audio stage aborted, skipping the rest of the run");
            summary.aborted = true;
            return Ok(summary);
        }

        let subtitle = SubtitleStage::new(
            Arc::clone(&self.source),
            &storage.subtitle_dir,
            naming.clone(),
            stages.subtitle.language.clone(),
            Some(stages.subtitle.quota),
        );
        let pacer = Pacer::fixed(Duration::from_secs(stages.subtitle.pause_secs));
        summary
            .stages
            .push(StageRunner::new(pacer).run(&subtitle, &catalog).await?);

        let notes = NotesStage::new(&storage.notes_dir, naming.clone());
        summary
            .stages
            .push(StageRunner::new(Pacer::none()).run(&notes, &catalog).await?);

        let transcript = TranscriptStage::new(
            Arc::clone(&self.transcriber),
            &storage.audio_dir,
            naming.clone(),
            audio_extensions,
            &storage.transcript_dir,
            Some(stages.transcript.quota),
        );
        summary
            .stages
            .push(StageRunner::new(Pacer::none()).run(&transcript, &catalog).await?);

        let summary_stage = SummaryStage::new(
            Arc::clone(&self.summarizer),
            &storage.transcript_dir,
            &storage.summary_dir,
            stages.summary.min_density,
            stages.summary.max_attempts,
            Some(stages.summary.quota),
        );
        summary
            .stages
            .push(StageRunner::new(Pacer::none()).run(&summary_stage, &catalog).await?);

        // Listing documents are cheap; rebuild them every run.
        let builder = DocumentBuilder::new(
            &storage.pages_dir,
            &storage.summary_dir,
            &storage.transcript_dir,
            self.config.docs.batch_size,
            self.config.docs.order,
            self.config.docs.title.clone(),
        );
        summary.pages_written = builder.write_all(&catalog).await?;

        // Archive mirror runs last so it sees everything this run produced.
        if let Some(ref archive_dir) = storage.archive_dir {
            let mirror = ArchiveMirror::new(archive_dir);
            let local_dirs = vec![
                storage.audio_dir.clone(),
                storage.subtitle_dir.clone(),
                storage.notes_dir.clone(),
            ];
            summary.mirror = Some(mirror.mirror(&local_dirs).await?);
        } else {
            info!("no archive directory configured, skipping mirror");
        }

        info!(
            discovered = summary.discovered,
            added = summary.added,
            dates_resolved = summary.dates_resolved,
            pages = summary.pages_written,
            "run finished"
        );
        Ok(summary)
    }
}
