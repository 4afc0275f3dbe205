//! The generic bounded-quota stage runner.
//!
//! Each artifact stage is a specialization of the same loop: walk the
//! catalog in a stage-specific order, skip items whose artifact already
//! landed on disk, produce the rest, and stop once the per-run quota of
//! successful productions is spent. Skip-if-exists makes every stage
//! naturally resumable; quotas bound external API and bandwidth use per
//! invocation so the pipeline can run on a schedule.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::catalog::{Catalog, CatalogEntry};

use super::pacer::Pacer;
use super::types::{FailurePolicy, StageError, StageReport, Traversal};

/// One artifact-producing stage of the pipeline.
#[async_trait]
pub trait ArtifactStage: Send + Sync {
    /// Returns the name of this stage.
    fn name(&self) -> &str;

    /// Directory the stage writes into; created lazily by the runner.
    fn output_dir(&self) -> &Path;

    fn traversal(&self) -> Traversal {
        Traversal::OldestFirst
    }

    /// Maximum successful productions per invocation; `None` means the
    /// stage is cheap enough to cover the whole catalog every run.
    fn quota(&self) -> Option<u32> {
        None
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::ContinueRun
    }

    /// Presence predicate: did this item's artifact already land on disk?
    fn exists(&self, entry: &CatalogEntry) -> bool;

    /// Produces the artifact for one item. Output must go through a
    /// scratch file and an atomic rename into the final name.
    async fn produce(&self, entry: &CatalogEntry) -> Result<(), StageError>;
}

/// Drives one [`ArtifactStage`] over the catalog.
pub struct StageRunner {
    pacer: Pacer,
}

impl StageRunner {
    pub fn new(pacer: Pacer) -> Self {
        Self { pacer }
    }

    /// Runs the stage to quota exhaustion or end of catalog.
    ///
    /// Item-level failures are logged with the item's identity and do not
    /// interrupt the walk unless the stage's policy is
    /// [`FailurePolicy::AbortRun`]. Only environmental failures (the
    /// output directory cannot be created) surface as `Err`.
    pub async fn run(
        &self,
        stage: &dyn ArtifactStage,
        catalog: &Catalog,
    ) -> Result<StageReport, StageError> {
        tokio::fs::create_dir_all(stage.output_dir()).await?;

        let mut report = StageReport::new(stage.name());
        let entries: Vec<&CatalogEntry> = match stage.traversal() {
            Traversal::OldestFirst => catalog.entries().iter().collect(),
            Traversal::NewestFirst => catalog.entries().iter().rev().collect(),
        };

        for entry in entries {
            if stage.exists(entry) {
                report.skipped_existing += 1;
                continue;
            }

            debug!(stage = stage.name(), idx = entry.idx, id = %entry.id, "producing artifact");
            match stage.produce(entry).await {
                Ok(()) => {
                    report.produced += 1;
                    info!(stage = stage.name(), idx = entry.idx, id = %entry.id, "artifact produced");
                    if let Some(quota) = stage.quota() {
                        if report.produced >= quota {
                            report.quota_reached = true;
                            info!(stage = stage.name(), quota, "per-run quota reached");
                            break;
                        }
                    }
                    self.pacer.pause().await;
                }
                Err(StageError::Unavailable(reason)) => {
                    report.skipped_unavailable += 1;
                    warn!(stage = stage.name(), idx = entry.idx, id = %entry.id, %reason, "skipped: unavailable");
                }
                Err(e) => {
                    report.failed += 1;
                    error!(stage = stage.name(), idx = entry.idx, id = %entry.id, error = %e, "production failed");
                    if stage.failure_policy() == FailurePolicy::AbortRun {
                        report.aborted = true;
                        error!(stage = stage.name(), "abort-on-failure policy: terminating stage");
                        break;
                    }
                }
            }
        }

        info!(
            stage = stage.name(),
            produced = report.produced,
            skipped_existing = report.skipped_existing,
            skipped_unavailable = report.skipped_unavailable,
            failed = report.failed,
            "stage finished"
        );
        Ok(report)
    }
}
