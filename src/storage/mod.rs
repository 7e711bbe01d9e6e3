//! Record serializer: intermediate on-disk representation.
//!
//! Basic records accumulate into one catalog file, detail records get an
//! index entry plus one file each under `detailed/`, named by a stable,
//! content-derived scheme. Everything is pretty-printed UTF-8 JSON so the
//! data directory stays human-diffable.

mod translit;

pub use translit::transliterate;

use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;
use url::Url;

use crate::config::DataLayout;
use crate::models::{BasicRecord, DetailIndexEntry, DetailRecord};

/// Length budget for a detail filename, excluding the `.json` extension.
pub const MAX_BASENAME_LEN: usize = 60;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes the intermediate catalogs for one crawl run.
///
/// Catalogs are buffered and flushed once at the end of the run;
/// per-record detail files are written immediately so an interrupted
/// crawl keeps every completed record.
pub struct CatalogWriter {
    layout: DataLayout,
    basic: Vec<BasicRecord>,
    detailed_index: Vec<DetailIndexEntry>,
}

impl CatalogWriter {
    pub fn new(layout: &DataLayout) -> Result<Self, StorageError> {
        layout.ensure()?;
        Ok(Self {
            layout: layout.clone(),
            basic: Vec::new(),
            detailed_index: Vec::new(),
        })
    }

    /// Append one basic record to the catalog.
    pub fn append_basic(&mut self, record: BasicRecord) {
        self.basic.push(record);
    }

    /// Persist one detail record and index it. Returns the generated
    /// filename.
    pub fn write_detail(&mut self, record: &DetailRecord) -> Result<String, StorageError> {
        let filename = detail_filename(&record.missile_name, &record.detail_page_url);
        let path = self.layout.detailed_dir().join(&filename);
        fs::write(&path, serde_json::to_vec_pretty(record)?)?;

        self.detailed_index.push(DetailIndexEntry {
            name: record.missile_name.clone(),
            detail_page_url: record.detail_page_url.clone(),
            index_page_url: record.index_page_url.clone(),
            page_number: record.page_number,
            detailed_filename: filename.clone(),
            scraped_at: record.scraped_at,
        });
        Ok(filename)
    }

    /// Write both catalog files.
    ///
    /// Catalogs are written even when empty so a subsequent import finds
    /// its required inputs after any completed crawl.
    pub fn flush(&self) -> Result<(), StorageError> {
        write_json(self.layout.basic_catalog(), &self.basic)?;
        write_json(self.layout.detailed_index(), &self.detailed_index)?;
        info!(
            "Flushed {} basic records and {} index entries to {}",
            self.basic.len(),
            self.detailed_index.len(),
            self.layout.root.display()
        );
        Ok(())
    }
}

fn write_json<T: serde::Serialize>(path: PathBuf, value: &T) -> Result<(), StorageError> {
    fs::write(path, serde_json::to_vec_pretty(value)?)?;
    Ok(())
}

/// Build the filename for a detail record.
///
/// `<locator path prefix>_<transliterated name>` truncated to the length
/// budget, plus `.json`. The prefix keeps names from colliding across
/// records whose display names transliterate identically; truncation
/// collisions remain possible and are accepted.
pub fn detail_filename(name: &str, detail_url: &str) -> String {
    let prefix = url_prefix(detail_url);
    let clean = sanitize_token(&transliterate(name));

    let mut base = format!("{}_{}", prefix, clean);
    if base.len() > MAX_BASENAME_LEN {
        base.truncate(MAX_BASENAME_LEN);
    }
    format!("{}.json", base)
}

/// Path segment after `/missile/` in a detail locator, or `missile` when
/// the locator has an unexpected shape.
fn url_prefix(detail_url: &str) -> String {
    Url::parse(detail_url)
        .ok()
        .and_then(|url| {
            let segments: Vec<String> = url
                .path_segments()?
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if segments.len() >= 2 && segments[0] == "missile" {
                Some(segments[1].clone())
            } else {
                None
            }
        })
        .unwrap_or_else(|| "missile".to_string())
}

/// Collapse anything outside `[A-Za-z0-9_-]` to `_`, squeeze runs of `_`,
/// and trim leading/trailing `_`.
fn sanitize_token(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_underscore = false;
    for ch in text.chars() {
        let mapped = if ch.is_ascii_alphanumeric() || ch == '-' {
            ch
        } else {
            '_'
        };
        if mapped == '_' {
            if !last_was_underscore {
                out.push('_');
            }
            last_was_underscore = true;
        } else {
            out.push(mapped);
            last_was_underscore = false;
        }
    }
    out.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn sample_detail(name: &str, url: &str) -> DetailRecord {
        DetailRecord {
            missile_name: name.to_string(),
            detail_page_url: url.to_string(),
            index_page_url: "https://missilery.info/search".to_string(),
            page_number: 1,
            scraped_at: Utc::now(),
            structured_content: BTreeMap::new(),
            description: None,
            characteristics_table: Vec::new(),
            image_urls: Vec::new(),
            gallery_images: Vec::new(),
        }
    }

    #[test]
    fn filename_uses_prefix_and_transliterated_name() {
        let filename = detail_filename("Тополь-М", "https://missilery.info/missile/topol-m");
        assert_eq!(filename, "topol-m_Topol-M.json");
    }

    #[test]
    fn filename_respects_length_budget_and_is_stable() {
        let long_name = "Очень длинное название ракетного комплекса с множеством слов \
                         и уточнений в скобках";
        let url = "https://missilery.info/missile/very-long";
        let a = detail_filename(long_name, url);
        let b = detail_filename(long_name, url);
        assert_eq!(a, b);
        let base = a.strip_suffix(".json").unwrap();
        assert!(base.len() <= MAX_BASENAME_LEN);
        assert!(base.starts_with("very-long_"));
    }

    #[test]
    fn unexpected_locator_shape_gets_generic_prefix() {
        assert_eq!(
            detail_filename("X-1", "https://example.com/other/path"),
            "missile_X-1.json"
        );
    }

    #[test]
    fn writer_round_trips_catalogs() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        let mut writer = CatalogWriter::new(&layout).unwrap();

        writer.append_basic(BasicRecord {
            name: "X-1".to_string(),
            detail_page_url: "https://missilery.info/missile/x1".to_string(),
            index_page_url: "https://missilery.info/search".to_string(),
            page_number: 1,
            base: None,
            purpose: None,
            warhead: None,
            guidance_system: None,
            country: Some("Россия".to_string()),
            range_km: Some(500),
            year_developed: None,
            description: String::new(),
            is_detailed: false,
        });
        let filename = writer
            .write_detail(&sample_detail("X-1", "https://missilery.info/missile/x1"))
            .unwrap();
        writer.flush().unwrap();

        assert!(layout.detailed_dir().join(&filename).exists());

        let basic: Vec<BasicRecord> =
            serde_json::from_str(&fs::read_to_string(layout.basic_catalog()).unwrap()).unwrap();
        assert_eq!(basic.len(), 1);
        assert_eq!(basic[0].country.as_deref(), Some("Россия"));

        let index: Vec<DetailIndexEntry> =
            serde_json::from_str(&fs::read_to_string(layout.detailed_index()).unwrap()).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index[0].detailed_filename, filename);
    }
}
