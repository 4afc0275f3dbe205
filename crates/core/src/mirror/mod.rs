//! Archive mirror - one-way, non-overwriting copies into long-term
//! storage.
//!
//! This is a write-once union merge, not a sync: a file is copied only
//! when the archive has no file of that name, nothing is ever overwritten
//! or deleted on either side, and files removed locally stay in the
//! archive indefinitely.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

/// Outcome counters for one mirror pass.
#[derive(Debug, Clone, Default)]
pub struct MirrorReport {
    pub copied: u32,
    pub skipped_existing: u32,
    pub failed: u32,
}

/// Errors for mirror operations.
///
/// Per-file copy failures are logged and counted, never raised; only the
/// archive directory itself being unusable surfaces as an error.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("archive directory unusable: {0}")]
    Io(#[from] std::io::Error),
}

/// Mirrors local artifact directories into the archive directory.
pub struct ArchiveMirror {
    archive_dir: PathBuf,
}

impl ArchiveMirror {
    pub fn new(archive_dir: impl Into<PathBuf>) -> Self {
        Self {
            archive_dir: archive_dir.into(),
        }
    }

    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    /// Copies every file directly under each local directory into the
    /// archive, unless a file of the same name is already there.
    pub async fn mirror(&self, local_dirs: &[PathBuf]) -> Result<MirrorReport, MirrorError> {
        tokio::fs::create_dir_all(&self.archive_dir).await?;

        let mut report = MirrorReport::default();
        for dir in local_dirs {
            if !dir.exists() {
                debug!(dir = %dir.display(), "local directory absent, nothing to mirror");
                continue;
            }

            let mut entries = match tokio::fs::read_dir(dir).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "cannot read local directory");
                    report.failed += 1;
                    continue;
                }
            };

            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(dir = %dir.display(), error = %e, "directory walk failed");
                        report.failed += 1;
                        break;
                    }
                };

                let source = entry.path();
                if !source.is_file() {
                    continue;
                }
                let Some(file_name) = source.file_name() else {
                    continue;
                };

                let destination = self.archive_dir.join(file_name);
                if destination.exists() {
                    report.skipped_existing += 1;
                    continue;
                }

                match tokio::fs::copy(&source, &destination).await {
                    Ok(_) => {
                        report.copied += 1;
                        info!(file = %source.display(), "mirrored into archive");
                    }
                    Err(e) => {
                        report.failed += 1;
                        warn!(file = %source.display(), error = %e, "mirror copy failed");
                    }
                }
            }
        }

        info!(
            copied = report.copied,
            skipped_existing = report.skipped_existing,
            failed = report.failed,
            "mirror pass finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_copies_new_files() {
        let local = TempDir::new().unwrap();
        let archive = TempDir::new().unwrap();
        tokio::fs::write(local.path().join("a.mp3"), "audio")
            .await
            .unwrap();
        tokio::fs::write(local.path().join("b.srt"), "subs")
            .await
            .unwrap();

        let mirror = ArchiveMirror::new(archive.path());
        let report = mirror
            .mirror(&[local.path().to_path_buf()])
            .await
            .unwrap();

        assert_eq!(report.copied, 2);
        assert!(archive.path().join("a.mp3").exists());
        assert!(archive.path().join("b.srt").exists());
    }

    #[tokio::test]
    async fn test_never_overwrites_existing_archive_file() {
        let local = TempDir::new().unwrap();
        let archive = TempDir::new().unwrap();
        tokio::fs::write(local.path().join("a.mp3"), "new local content")
            .await
            .unwrap();
        tokio::fs::write(archive.path().join("a.mp3"), "original archive content")
            .await
            .unwrap();

        let mirror = ArchiveMirror::new(archive.path());
        let report = mirror
            .mirror(&[local.path().to_path_buf()])
            .await
            .unwrap();

        assert_eq!(report.copied, 0);
        assert_eq!(report.skipped_existing, 1);
        let kept = tokio::fs::read_to_string(archive.path().join("a.mp3"))
            .await
            .unwrap();
        assert_eq!(kept, "original archive content");
    }

    #[tokio::test]
    async fn test_second_pass_copies_nothing() {
        let local = TempDir::new().unwrap();
        let archive = TempDir::new().unwrap();
        tokio::fs::write(local.path().join("a.mp3"), "audio")
            .await
            .unwrap();

        let mirror = ArchiveMirror::new(archive.path());
        assert_eq!(
            mirror
                .mirror(&[local.path().to_path_buf()])
                .await
                .unwrap()
                .copied,
            1
        );
        let second = mirror.mirror(&[local.path().to_path_buf()]).await.unwrap();
        assert_eq!(second.copied, 0);
        assert_eq!(second.skipped_existing, 1);
    }

    #[tokio::test]
    async fn test_absent_local_dir_is_fine() {
        let archive = TempDir::new().unwrap();
        let mirror = ArchiveMirror::new(archive.path());

        let report = mirror
            .mirror(&[PathBuf::from("/nonexistent/tapedeck-dir")])
            .await
            .unwrap();
        assert_eq!(report.copied, 0);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn test_subdirectories_are_ignored() {
        let local = TempDir::new().unwrap();
        let archive = TempDir::new().unwrap();
        tokio::fs::create_dir(local.path().join("nested")).await.unwrap();
        tokio::fs::write(local.path().join("a.txt"), "x").await.unwrap();

        let mirror = ArchiveMirror::new(archive.path());
        let report = mirror
            .mirror(&[local.path().to_path_buf()])
            .await
            .unwrap();

        assert_eq!(report.copied, 1);
        assert!(!archive.path().join("nested").exists());
    }
}
