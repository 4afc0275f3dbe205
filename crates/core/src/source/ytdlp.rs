//! yt-dlp based media source implementation.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use crate::catalog::{watch_url, DiscoveredMedia, UploadDate};

use super::{MediaSource, SourceError};

/// Configuration for the yt-dlp collaborator.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct YtDlpConfig {
    /// Path to the yt-dlp binary.
    #[serde(default = "default_binary_path")]
    pub binary_path: String,
    /// Items longer than this (or with no duration at all) are excluded
    /// from playlist listings.
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: u64,
    /// Per-invocation timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra arguments appended to every invocation.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for YtDlpConfig {
    fn default() -> Self {
        Self {
            binary_path: default_binary_path(),
            max_duration_secs: default_max_duration_secs(),
            timeout_secs: default_timeout_secs(),
            extra_args: Vec::new(),
        }
    }
}

fn default_binary_path() -> String {
    "yt-dlp".to_string()
}

fn default_max_duration_secs() -> u64 {
    36_000
}

fn default_timeout_secs() -> u64 {
    600
}

/// Media source backed by the yt-dlp command line tool.
pub struct YtDlpSource {
    config: YtDlpConfig,
}

impl YtDlpSource {
    pub fn new(config: YtDlpConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(YtDlpConfig::default())
    }

    /// Runs yt-dlp with the given arguments and returns its stdout.
    async fn run(&self, args: &[String]) -> Result<String, SourceError> {
        let mut command = Command::new(&self.config.binary_path);
        command
            .args(args)
            .args(&self.config.extra_args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(binary = %self.config.binary_path, ?args, "invoking yt-dlp");

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let output = timeout(timeout_duration, async {
            command.output().await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SourceError::ToolNotFound {
                        tool: "yt-dlp".to_string(),
                        path: self.config.binary_path.clone(),
                    }
                } else {
                    SourceError::Io(e)
                }
            })
        })
        .await
        .map_err(|_| SourceError::Timeout(timeout_duration))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(SourceError::ToolFailed {
                tool: "yt-dlp".to_string(),
                status: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[derive(Deserialize)]
struct PlaylistDump {
    #[serde(default)]
    entries: Vec<PlaylistEntry>,
}

#[derive(Deserialize)]
struct PlaylistEntry {
    id: String,
    title: Option<String>,
    duration: Option<f64>,
    upload_date: Option<String>,
}

/// Parses yt-dlp's compact `YYYYMMDD` date form.
fn parse_compact_date(raw: &str) -> UploadDate {
    NaiveDate::parse_from_str(raw.trim(), "%Y%m%d")
        .map(UploadDate::Known)
        .unwrap_or(UploadDate::Unknown)
}

#[async_trait]
impl MediaSource for YtDlpSource {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn list_playlist(
        &self,
        playlist_url: &str,
    ) -> Result<Vec<DiscoveredMedia>, SourceError> {
        let args = vec![
            "--flat-playlist".to_string(),
            "--dump-single-json".to_string(),
            "--no-warnings".to_string(),
            playlist_url.to_string(),
        ];
        let stdout = self.run(&args).await?;

        let dump: PlaylistDump = serde_json::from_str(&stdout)
            .map_err(|e| SourceError::Parse(format!("playlist dump: {e}")))?;

        let ceiling = self.config.max_duration_secs;
        let mut discovered = Vec::new();
        for entry in dump.entries {
            let duration_secs = entry.duration.map(|d| d as u64);
            match duration_secs {
                Some(secs) if secs <= ceiling => {}
                _ => {
                    debug!(id = %entry.id, ?duration_secs, "excluding over-length or live entry");
                    continue;
                }
            }
            discovered.push(DiscoveredMedia {
                upload_date: entry
                    .upload_date
                    .as_deref()
                    .map(parse_compact_date)
                    .unwrap_or(UploadDate::Unknown),
                title: entry.title.unwrap_or_else(|| entry.id.clone()),
                id: entry.id,
                duration_secs,
            });
        }
        Ok(discovered)
    }

    async fn resolve_upload_date(&self, media_id: &str) -> Result<UploadDate, SourceError> {
        let args = vec![
            "--print".to_string(),
            "upload_date".to_string(),
            "--skip-download".to_string(),
            "--no-warnings".to_string(),
            watch_url(media_id),
        ];
        let stdout = self.run(&args).await?;
        let raw = stdout.lines().next().unwrap_or("").trim();
        if raw.is_empty() || raw == "NA" {
            return Ok(UploadDate::Unknown);
        }
        Ok(parse_compact_date(raw))
    }

    async fn fetch_audio(&self, media_id: &str, dest: &Path) -> Result<(), SourceError> {
        // yt-dlp substitutes the post-processed extension itself, so the
        // output template carries %(ext)s; the result is folded onto the
        // destination the caller asked for.
        let args = vec![
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            "mp3".to_string(),
            "--no-progress".to_string(),
            "--no-warnings".to_string(),
            "--output".to_string(),
            format!("{}.%(ext)s", dest.display()),
            watch_url(media_id),
        ];
        self.run(&args).await?;

        let written = PathBuf::from(format!("{}.mp3", dest.display()));
        if !written.exists() {
            return Err(SourceError::Parse(format!(
                "yt-dlp reported success but {} is missing",
                written.display()
            )));
        }
        tokio::fs::rename(&written, dest).await?;
        Ok(())
    }

    async fn fetch_subtitle(
        &self,
        media_id: &str,
        language: &str,
        dest: &Path,
    ) -> Result<(), SourceError> {
        let stem = dest.with_extension("");
        let args = vec![
            "--write-subs".to_string(),
            "--sub-langs".to_string(),
            language.to_string(),
            "--convert-subs".to_string(),
            "srt".to_string(),
            "--skip-download".to_string(),
            "--no-warnings".to_string(),
            "--output".to_string(),
            stem.to_string_lossy().to_string(),
            watch_url(media_id),
        ];
        self.run(&args).await?;

        // yt-dlp names the track `<stem>.<lang>.srt`; fold it onto the
        // destination the caller asked for.
        let written = PathBuf::from(format!("{}.{}.srt", stem.display(), language));
        if !written.exists() {
            return Err(SourceError::NotAvailable(format!(
                "no {language} subtitle for {media_id}"
            )));
        }
        if let Err(e) = tokio::fs::rename(&written, dest).await {
            warn!(from = %written.display(), to = %dest.display(), error = %e, "failed to move subtitle");
            return Err(SourceError::Io(e));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compact_date() {
        assert_eq!(
            parse_compact_date("20240301"),
            "2024-03-01".parse().unwrap()
        );
        assert_eq!(parse_compact_date("NA"), UploadDate::Unknown);
        assert_eq!(parse_compact_date(""), UploadDate::Unknown);
    }

    #[test]
    fn test_playlist_dump_parsing_and_filtering() {
        let json = r#"{
            "entries": [
                {"id": "a", "title": "short", "duration": 120.0, "upload_date": "20240102"},
                {"id": "b", "title": "live", "duration": null},
                {"id": "c", "title": "marathon", "duration": 90000.0}
            ]
        }"#;
        let dump: PlaylistDump = serde_json::from_str(json).unwrap();
        assert_eq!(dump.entries.len(), 3);

        // The filtering itself is exercised through list_playlist's ceiling
        // logic; replicate the predicate here on the parsed entries.
        let ceiling = YtDlpConfig::default().max_duration_secs;
        let kept: Vec<_> = dump
            .entries
            .iter()
            .filter(|e| matches!(e.duration.map(|d| d as u64), Some(s) if s <= ceiling))
            .collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "a");
    }

    #[tokio::test]
    async fn test_missing_binary_is_tool_not_found() {
        let source = YtDlpSource::new(YtDlpConfig {
            binary_path: "/nonexistent/yt-dlp".to_string(),
            ..YtDlpConfig::default()
        });

        let err = source.list_playlist("https://example.com/p").await.unwrap_err();
        assert!(matches!(err, SourceError::ToolNotFound { .. }));
    }
}
