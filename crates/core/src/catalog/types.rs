//! Types for the media catalog (the durable index of known playlist items).

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Upload date of a catalog entry.
///
/// Persisted as ISO-8601 `YYYY-MM-DD`, or the literal `unknown` when the
/// source has not resolved it yet. `Unknown` is the only field of an entry
/// that may be mutated after the entry is first persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadDate {
    Known(NaiveDate),
    Unknown,
}

impl UploadDate {
    pub fn is_known(&self) -> bool {
        matches!(self, UploadDate::Known(_))
    }
}

impl fmt::Display for UploadDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadDate::Known(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            UploadDate::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for UploadDate {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "unknown" {
            return Ok(UploadDate::Unknown);
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d").map(UploadDate::Known)
    }
}

impl Serialize for UploadDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UploadDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One cataloged item.
///
/// `idx` is dense and contiguous from 1, assigned in merge order at first
/// sight and never reassigned or reused. `id` is the opaque identifier the
/// external source uses; it is the primary key across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub idx: u32,
    pub id: String,
    pub title: String,
    pub url: String,
    pub date: UploadDate,
}

/// A raw playlist entry from the source collaborator, before merging.
#[derive(Debug, Clone)]
pub struct DiscoveredMedia {
    pub id: String,
    pub title: String,
    /// Unset for live broadcasts and other items without a fixed length.
    pub duration_secs: Option<u64>,
    pub upload_date: UploadDate,
}

/// Canonical watch URL for a media id.
pub fn watch_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={id}")
}

/// The ordered collection of catalog entries.
///
/// Entries are kept in ascending `idx` order, which is also first-seen
/// order. The catalog is append-only: entries are never removed, and only
/// an entry's `date` may change after it is added.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [CatalogEntry] {
        &mut self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// High-water mark of assigned indices, 0 for an empty catalog.
    pub fn max_idx(&self) -> u32 {
        self.entries.iter().map(|e| e.idx).max().unwrap_or(0)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Append-only merge of freshly discovered items.
    ///
    /// Items whose id is already cataloged are dropped. Survivors are
    /// assigned indices from `max_idx + 1` in ascending title order (ties
    /// broken by id) so that repeated discoveries of the same batch produce
    /// the same assignment. Existing entries are never rewritten.
    ///
    /// Returns the newly added entries.
    pub fn merge_discovered(&mut self, discovered: Vec<DiscoveredMedia>) -> Vec<CatalogEntry> {
        let known: std::collections::HashSet<&str> =
            self.entries.iter().map(|e| e.id.as_str()).collect();

        let mut fresh: Vec<DiscoveredMedia> = Vec::new();
        let mut seen_in_batch = std::collections::HashSet::new();
        for media in discovered {
            if known.contains(media.id.as_str()) || !seen_in_batch.insert(media.id.clone()) {
                continue;
            }
            fresh.push(media);
        }

        fresh.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));

        let mut next_idx = self.max_idx() + 1;
        let mut added = Vec::with_capacity(fresh.len());
        for media in fresh {
            let entry = CatalogEntry {
                idx: next_idx,
                url: watch_url(&media.id),
                id: media.id,
                title: media.title,
                date: media.upload_date,
            };
            next_idx += 1;
            added.push(entry.clone());
            self.entries.push(entry);
        }
        added
    }
}

/// Errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The persisted table is unreadable or does not match the expected
    /// column set. Fatal; the store never attempts a repair.
    #[error("corrupt catalog at {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("catalog I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discovered(id: &str, title: &str) -> DiscoveredMedia {
        DiscoveredMedia {
            id: id.to_string(),
            title: title.to_string(),
            duration_secs: Some(60),
            upload_date: UploadDate::Unknown,
        }
    }

    #[test]
    fn test_upload_date_round_trip() {
        let known: UploadDate = "2024-03-01".parse().unwrap();
        assert_eq!(known.to_string(), "2024-03-01");

        let unknown: UploadDate = "unknown".parse().unwrap();
        assert_eq!(unknown, UploadDate::Unknown);
        assert_eq!(unknown.to_string(), "unknown");

        assert!("03/01/2024".parse::<UploadDate>().is_err());
    }

    #[test]
    fn test_merge_assigns_contiguous_indices() {
        let mut catalog = Catalog::default();
        let added = catalog.merge_discovered(vec![
            discovered("c", "gamma"),
            discovered("a", "alpha"),
            discovered("b", "beta"),
        ]);

        let indices: Vec<u32> = added.iter().map(|e| e.idx).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        // Ascending title order decides the assignment.
        assert_eq!(added[0].title, "alpha");
        assert_eq!(added[2].title, "gamma");
        assert_eq!(added[0].url, "https://www.youtube.com/watch?v=a");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut catalog = Catalog::default();
        let batch = vec![discovered("a", "alpha"), discovered("b", "beta")];
        assert_eq!(catalog.merge_discovered(batch.clone()).len(), 2);
        assert_eq!(catalog.merge_discovered(batch).len(), 0);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_merge_reintroduced_ids_are_dropped() {
        let mut catalog = Catalog::default();
        catalog.merge_discovered(vec![
            discovered("a", "one"),
            discovered("b", "two"),
            discovered("c", "three"),
            discovered("d", "four"),
            discovered("e", "five"),
        ]);
        assert_eq!(catalog.max_idx(), 5);

        // Ids of existing entries 2 and 4 come around again, plus one new id.
        let reintroduced_b = catalog.entries()[1].id.clone();
        let reintroduced_d = catalog.entries()[3].id.clone();
        let added = catalog.merge_discovered(vec![
            discovered(&reintroduced_b, "two"),
            discovered(&reintroduced_d, "four"),
            discovered("f", "six"),
        ]);

        assert_eq!(added.len(), 1);
        assert_eq!(added[0].idx, 6);
        assert_eq!(catalog.len(), 6);
    }

    #[test]
    fn test_merge_never_rewrites_existing_entries() {
        let mut catalog = Catalog::default();
        catalog.merge_discovered(vec![discovered("a", "alpha")]);
        let before = catalog.entries()[0].clone();

        catalog.merge_discovered(vec![discovered("b", "beta")]);
        assert_eq!(catalog.entries()[0], before);
    }

    #[test]
    fn test_merge_duplicate_ids_within_batch() {
        let mut catalog = Catalog::default();
        let added = catalog.merge_discovered(vec![
            discovered("a", "alpha"),
            discovered("a", "alpha again"),
        ]);
        assert_eq!(added.len(), 1);
    }
}
