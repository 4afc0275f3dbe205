//! CSV-backed catalog store.
//!
//! The catalog is a flat table with columns `idx,id,title,url,date`, owned
//! exclusively by this store. Saves go through a temporary file and an
//! atomic rename so a crash mid-write leaves either the old or the new
//! table on disk, never a truncated one.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::source::MediaSource;

use super::types::{Catalog, CatalogEntry, CatalogError, UploadDate};

/// Column set the persisted table must carry, in order.
const COLUMNS: [&str; 5] = ["idx", "id", "title", "url", "date"];

/// Loads and persists the catalog table.
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted table.
    ///
    /// A missing file yields an empty catalog (idx high-water mark 0). A
    /// header row that differs from the expected column set, or any row
    /// that fails to parse, yields [`CatalogError::Corrupt`].
    pub async fn load(&self) -> Result<Catalog, CatalogError> {
        if !self.path.exists() {
            return Ok(Catalog::default());
        }

        let raw = tokio::fs::read(&self.path).await?;
        let mut reader = csv::Reader::from_reader(raw.as_slice());

        let headers = reader.headers().map_err(|e| self.corrupt(e.to_string()))?;
        if headers.iter().ne(COLUMNS) {
            return Err(self.corrupt(format!(
                "expected columns {:?}, found {:?}",
                COLUMNS.join(","),
                headers.iter().collect::<Vec<_>>().join(",")
            )));
        }

        let mut entries = Vec::new();
        for record in reader.deserialize::<CatalogEntry>() {
            entries.push(record.map_err(|e| self.corrupt(e.to_string()))?);
        }

        Ok(Catalog::new(entries))
    }

    /// Persists the full catalog, replacing the prior file.
    pub async fn save(&self, catalog: &Catalog) -> Result<(), CatalogError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // The header row is written explicitly so an empty catalog still
        // round-trips.
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer
            .write_record(COLUMNS)
            .map_err(|e| self.corrupt(format!("failed to encode header: {e}")))?;
        for entry in catalog.entries() {
            writer
                .serialize(entry)
                .map_err(|e| self.corrupt(format!("failed to encode row: {e}")))?;
        }
        let encoded = writer
            .into_inner()
            .map_err(|e| self.corrupt(format!("failed to flush table: {e}")))?;

        let tmp = scratch_sibling(&self.path);
        tokio::fs::write(&tmp, &encoded).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Resolves `unknown` upload dates in place, newest entries first.
    ///
    /// Stops after `quota` successful resolutions. Resolver errors and
    /// still-unknown answers are logged and skipped without consuming the
    /// quota. The whole table is re-persisted once at the end iff anything
    /// changed; all other rows are written back untouched.
    ///
    /// Returns the number of dates resolved.
    pub async fn resolve_dates(
        &self,
        catalog: &mut Catalog,
        source: &dyn MediaSource,
        quota: u32,
    ) -> Result<u32, CatalogError> {
        let mut resolved = 0u32;

        for entry in catalog.entries_mut().iter_mut().rev() {
            if resolved >= quota {
                info!(quota, "date resolution quota reached");
                break;
            }
            if entry.date.is_known() {
                continue;
            }

            match source.resolve_upload_date(&entry.id).await {
                Ok(date @ UploadDate::Known(_)) => {
                    info!(idx = entry.idx, id = %entry.id, %date, "resolved upload date");
                    entry.date = date;
                    resolved += 1;
                }
                Ok(UploadDate::Unknown) => {
                    warn!(idx = entry.idx, id = %entry.id, "upload date still unknown");
                }
                Err(e) => {
                    warn!(idx = entry.idx, id = %entry.id, error = %e, "date resolution failed");
                }
            }
        }

        if resolved > 0 {
            self.save(catalog).await?;
        }
        Ok(resolved)
    }

    fn corrupt(&self, reason: String) -> CatalogError {
        CatalogError::Corrupt {
            path: self.path.clone(),
            reason,
        }
    }
}

/// Sibling path used for the write-then-rename dance.
fn scratch_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DiscoveredMedia;
    use tempfile::TempDir;

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::default();
        catalog.merge_discovered(vec![
            DiscoveredMedia {
                id: "aaa".to_string(),
                title: "first, with a comma".to_string(),
                duration_secs: Some(120),
                upload_date: "2023-11-05".parse().unwrap(),
            },
            DiscoveredMedia {
                id: "bbb".to_string(),
                title: "second".to_string(),
                duration_secs: Some(90),
                upload_date: UploadDate::Unknown,
            },
        ]);
        catalog
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = CatalogStore::new(temp.path().join("catalog.csv"));

        let catalog = store.load().await.unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.max_idx(), 0);
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = CatalogStore::new(temp.path().join("catalog.csv"));
        let catalog = sample_catalog();

        store.save(&catalog).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded.entries(), catalog.entries());
    }

    #[tokio::test]
    async fn test_empty_catalog_round_trips() {
        let temp = TempDir::new().unwrap();
        let store = CatalogStore::new(temp.path().join("catalog.csv"));

        store.save(&Catalog::default()).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn test_save_leaves_no_scratch_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("catalog.csv");
        let store = CatalogStore::new(&path);

        store.save(&sample_catalog()).await.unwrap();
        assert!(path.exists());
        assert!(!scratch_sibling(&path).exists());
    }

    #[tokio::test]
    async fn test_load_rejects_wrong_columns() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("catalog.csv");
        tokio::fs::write(&path, "idx,id,name,url,date\n1,a,x,u,unknown\n")
            .await
            .unwrap();

        let err = CatalogStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, CatalogError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_row() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("catalog.csv");
        tokio::fs::write(
            &path,
            "idx,id,title,url,date\nnot-a-number,a,t,u,unknown\n",
        )
        .await
        .unwrap();

        let err = CatalogStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, CatalogError::Corrupt { .. }));
    }
}
