//! Artifact presence checks and the atomic write discipline.
//!
//! Filesystem presence doubles as the progress tracker: an artifact exists
//! iff its stage already completed for that item. Keeping the checks here
//! means the marker could later be swapped for an explicit ledger without
//! touching stage logic.

use std::path::{Path, PathBuf};

/// Presence probe for one artifact directory.
#[derive(Debug, Clone)]
pub struct PresenceProbe {
    dir: PathBuf,
}

impl PresenceProbe {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Whether the named artifact already landed.
    pub fn exists(&self, file_name: &str) -> bool {
        self.dir.join(file_name).exists()
    }

    /// First existing file among `<stem>.<ext>` for the accepted extensions.
    pub fn first_existing(&self, stem: &str, extensions: &[String]) -> Option<PathBuf> {
        extensions
            .iter()
            .map(|ext| self.dir.join(format!("{stem}.{ext}")))
            .find(|path| path.exists())
    }

    /// Whether the artifact exists under any accepted extension.
    pub fn exists_any(&self, stem: &str, extensions: &[String]) -> bool {
        self.first_existing(stem, extensions).is_some()
    }
}

/// Scratch sibling of a final artifact path.
///
/// In-flight writes land here; only a fully written file is renamed onto
/// the final name, so the presence probe can never mistake a torso for a
/// completed artifact.
pub fn scratch_path(final_path: &Path) -> PathBuf {
    let mut name = final_path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Writes `contents` through a scratch file and an atomic rename.
pub async fn write_atomic(final_path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let scratch = scratch_path(final_path);
    tokio::fs::write(&scratch, contents).await?;
    tokio::fs::rename(&scratch, final_path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_probe_exists() {
        let temp = TempDir::new().unwrap();
        let probe = PresenceProbe::new(temp.path());

        assert!(!probe.exists("a.txt"));
        tokio::fs::write(temp.path().join("a.txt"), "x").await.unwrap();
        assert!(probe.exists("a.txt"));
    }

    #[tokio::test]
    async fn test_probe_any_extension() {
        let temp = TempDir::new().unwrap();
        let probe = PresenceProbe::new(temp.path());
        let exts = vec!["mp3".to_string(), "m4a".to_string()];

        assert!(!probe.exists_any("track_001", &exts));
        tokio::fs::write(temp.path().join("track_001.m4a"), "x")
            .await
            .unwrap();
        assert!(probe.exists_any("track_001", &exts));
        assert_eq!(
            probe.first_existing("track_001", &exts).unwrap(),
            temp.path().join("track_001.m4a")
        );
    }

    #[tokio::test]
    async fn test_write_atomic_leaves_no_scratch() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("note.txt");

        write_atomic(&target, b"hello").await.unwrap();

        assert_eq!(tokio::fs::read_to_string(&target).await.unwrap(), "hello");
        assert!(!scratch_path(&target).exists());
    }
}
