//! Configuration for the crawler and importer.
//!
//! Settings are loaded from an optional `missilery.toml` in the data
//! directory; every field has a sensible default so a bare data directory
//! works out of the box.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default catalog root.
pub const DEFAULT_BASE_URL: &str = "https://missilery.info";

/// Listing path under the base URL.
pub const SEARCH_PATH: &str = "/search";

/// Fallback ceiling when no pagination ordinal is discoverable.
pub const DEFAULT_MAX_PAGE: u32 = 22;

/// Crawl and import settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Catalog root URL.
    pub base_url: String,
    /// Ceiling on the zero-based `?page=N` ordinal when pagination
    /// discovery comes up empty.
    pub max_page: u32,
    /// Maximum concurrent in-flight fetches.
    pub concurrency: usize,
    /// Base delay between requests to the target host, in milliseconds.
    /// A jitter of up to 50% is added on top.
    pub request_delay_ms: u64,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Retry budget for transient fetch failures per locator.
    pub retry_budget: u32,
    /// Custom user agent, if any.
    pub user_agent: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_page: DEFAULT_MAX_PAGE,
            concurrency: 4,
            request_delay_ms: 1000,
            timeout_secs: 30,
            retry_budget: 3,
            user_agent: None,
        }
    }
}

impl Settings {
    /// Load settings from `missilery.toml` under the data directory,
    /// falling back to defaults when the file is absent.
    pub fn load(data_dir: &Path) -> anyhow::Result<Self> {
        let path = data_dir.join("missilery.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path)?;
        let settings = toml::from_str(&raw)?;
        Ok(settings)
    }

    /// The first listing page URL.
    pub fn search_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), SEARCH_PATH)
    }
}

/// Layout of the intermediate data directory.
#[derive(Debug, Clone)]
pub struct DataLayout {
    pub root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Append-only catalog of basic records.
    pub fn basic_catalog(&self) -> PathBuf {
        self.root.join("missiles_basic.json")
    }

    /// Index of detailed records.
    pub fn detailed_index(&self) -> PathBuf {
        self.root.join("missiles_detailed.json")
    }

    /// Directory holding one file per detail record.
    pub fn detailed_dir(&self) -> PathBuf {
        self.root.join("detailed")
    }

    /// Default database path inside the data directory.
    pub fn database(&self) -> PathBuf {
        self.root.join("missilery.db")
    }

    /// Create the data directories if missing.
    pub fn ensure(&self) -> std::io::Result<()> {
        fs::create_dir_all(self.detailed_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_config_absent() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.max_page, DEFAULT_MAX_PAGE);
        assert_eq!(settings.search_url(), "https://missilery.info/search");
    }

    #[test]
    fn loads_overrides_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("missilery.toml"),
            "max_page = 5\nconcurrency = 2\n",
        )
        .unwrap();
        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.max_page, 5);
        assert_eq!(settings.concurrency, 2);
        // Unspecified fields keep their defaults
        assert_eq!(settings.retry_budget, 3);
    }
}
