//! Paginated listing documents built from the catalog.
//!
//! The catalog is partitioned into contiguous idx ranges, one markdown
//! page per non-empty range, plus an index document linking the pages.
//! Rendering is deterministic: the same catalog, batch size and order
//! always produce the same page boundaries and the same bytes.

use std::path::{Path, PathBuf};

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::{Catalog, CatalogEntry, UploadDate};
use crate::stage::{write_atomic, PresenceProbe};

/// Rendering order of entries within a page (and of page links in the
/// index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PageOrder {
    Ascending,
    #[default]
    Descending,
}

/// One page worth of catalog entries.
#[derive(Debug, Clone)]
pub struct Page {
    /// Zero-based batch number; also the page's file name stem.
    pub batch: u32,
    /// Nominal idx range covered by this page, clamped to the catalog.
    pub start_idx: u32,
    pub end_idx: u32,
    pub entries: Vec<CatalogEntry>,
}

impl Page {
    pub fn file_name(&self) -> String {
        format!("{:02}-index.md", self.batch)
    }
}

/// Partitions the catalog into contiguous idx ranges of `batch_size`.
///
/// Only non-empty ranges yield a page. Within a page, entries are sorted
/// by idx in the requested order.
pub fn paginate(catalog: &Catalog, batch_size: u32, order: PageOrder) -> Vec<Page> {
    assert!(batch_size > 0, "batch_size must be positive");

    let max_idx = catalog.max_idx();
    if max_idx == 0 {
        return Vec::new();
    }

    let batches = max_idx.div_ceil(batch_size);
    let mut pages = Vec::new();
    for batch in 0..batches {
        let start_idx = batch * batch_size + 1;
        let end_idx = ((batch + 1) * batch_size).min(max_idx);

        let mut entries: Vec<CatalogEntry> = catalog
            .entries()
            .iter()
            .filter(|e| e.idx >= start_idx && e.idx <= end_idx)
            .cloned()
            .collect();
        if entries.is_empty() {
            continue;
        }

        match order {
            PageOrder::Ascending => entries.sort_by_key(|e| e.idx),
            PageOrder::Descending => entries.sort_by_key(|e| std::cmp::Reverse(e.idx)),
        }

        pages.push(Page {
            batch,
            start_idx,
            end_idx,
            entries,
        });
    }
    pages
}

/// Writes the paginated listing documents.
pub struct DocumentBuilder {
    pages_dir: PathBuf,
    summary_probe: PresenceProbe,
    transcript_probe: PresenceProbe,
    batch_size: u32,
    order: PageOrder,
    title: String,
    title_cleanup: Regex,
}

impl DocumentBuilder {
    pub fn new(
        pages_dir: impl Into<PathBuf>,
        summary_dir: impl Into<PathBuf>,
        transcript_dir: impl Into<PathBuf>,
        batch_size: u32,
        order: PageOrder,
        title: impl Into<String>,
    ) -> Self {
        Self {
            pages_dir: pages_dir.into(),
            summary_probe: PresenceProbe::new(summary_dir),
            transcript_probe: PresenceProbe::new(transcript_dir),
            batch_size,
            order,
            title: title.into(),
            // Bracketed tags the uploader puts in titles carry no
            // information in a listing.
            title_cleanup: Regex::new(r"【[^】]*】").expect("static regex"),
        }
    }

    pub fn pages_dir(&self) -> &Path {
        &self.pages_dir
    }

    /// Renders and writes every page plus the index document.
    ///
    /// Returns the number of pages written (the index not included).
    pub async fn write_all(&self, catalog: &Catalog) -> Result<u32, std::io::Error> {
        tokio::fs::create_dir_all(&self.pages_dir).await?;

        let pages = paginate(catalog, self.batch_size, self.order);
        for page in &pages {
            let body = self.render_page(page).await?;
            write_atomic(&self.pages_dir.join(page.file_name()), body.as_bytes()).await?;
            info!(
                page = %page.file_name(),
                start = page.start_idx,
                end = page.end_idx,
                entries = page.entries.len(),
                "page written"
            );
        }

        let index = self.render_index(catalog, &pages);
        write_atomic(&self.pages_dir.join("index.md"), index.as_bytes()).await?;

        Ok(pages.len() as u32)
    }

    async fn render_page(&self, page: &Page) -> Result<String, std::io::Error> {
        let mut body = String::new();
        for entry in &page.entries {
            body.push_str(&self.render_entry(entry).await?);
        }
        Ok(body)
    }

    async fn render_entry(&self, entry: &CatalogEntry) -> Result<String, std::io::Error> {
        let title = self
            .title_cleanup
            .replace_all(&entry.title, "")
            .trim()
            .to_string();

        let date_prefix = match entry.date {
            UploadDate::Known(_) => format!("[{}] ", entry.date),
            UploadDate::Unknown => String::new(),
        };

        let summary_path = self.summary_probe.path(&format!("{}.md", entry.id));
        let summary = if summary_path.exists() {
            tokio::fs::read_to_string(&summary_path).await?
        } else {
            String::new()
        };

        let transcript_link = if self.transcript_probe.exists(&format!("{}.txt", entry.id)) {
            format!("\n\n[Transcript](../transcript/{}.txt)", entry.id)
        } else {
            String::new()
        };

        Ok(format!(
            "<details>\n\
             <summary>{idx}. {date_prefix}{title}</summary><br>\n\
             \n\
             <a href=\"{url}\" target=\"_blank\">\n\
             \x20   <img src=\"https://img.youtube.com/vi/{id}/maxresdefault.jpg\"\n\
             \x20       alt=\"[thumbnail]\" width=\"200\">\n\
             </a>{transcript_link}\n\
             \n\
             # {title}\n\
             \n\
             {summary}\n\
             \n\
             ---\n\
             \n\
             </details>\n\
             \n",
            idx = entry.idx,
            url = entry.url,
            id = entry.id,
        ))
    }

    fn render_index(&self, catalog: &Catalog, pages: &[Page]) -> String {
        let latest_date = catalog
            .entries()
            .iter()
            .max_by_key(|e| e.idx)
            .map(|e| e.date.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let mut content = format!("# {} ({latest_date})\n\n---\n\n", self.title);

        let ordered: Vec<&Page> = match self.order {
            PageOrder::Ascending => pages.iter().collect(),
            PageOrder::Descending => pages.iter().rev().collect(),
        };
        for page in ordered {
            content.push_str(&format!(
                "- [{:04}~{:04}]({})\n",
                page.start_idx,
                page.end_idx,
                page.file_name()
            ));
        }
        content.push_str("\n---\n");
        content
    }
}
