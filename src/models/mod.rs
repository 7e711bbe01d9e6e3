//! Extraction record types.
//!
//! These are the tagged variants the extractors emit: a `BasicRecord` per
//! listing card and a `DetailRecord` per detail page, plus the index entry
//! the serializer writes for each detail record. All of them round-trip
//! through the intermediate JSON files.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Attributes extractable from one listing card without visiting the
/// detail page.
///
/// Invariant: `name` is non-empty; the card extractor discards cards that
/// yield no usable name instead of constructing an invalid record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicRecord {
    pub name: String,
    /// Unique key across all basic records.
    pub detail_page_url: String,
    pub index_page_url: String,
    pub page_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warhead: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance_system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_km: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_developed: Option<i32>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_detailed: bool,
}

/// One labeled field block from a detail page.
///
/// `links` and `urls` are populated with identical resolved URLs. The
/// upstream site scraper this replaces behaved that way (`links` was
/// presumably meant to carry link text) and downstream consumers depend
/// on the observed shape, so both lists are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredField {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub urls: Vec<String>,
}

/// One (name, value) row from a characteristics table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacteristicRow {
    pub field_name: String,
    pub field_value: String,
}

/// Richer attributes extractable only from a record's own detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub missile_name: String,
    /// Foreign key to the basic record, by URL equality.
    pub detail_page_url: String,
    pub index_page_url: String,
    pub page_number: u32,
    pub scraped_at: DateTime<Utc>,
    /// field-name -> field block; BTreeMap keeps the serialized form
    /// stable and diffable.
    #[serde(default)]
    pub structured_content: BTreeMap<String, StructuredField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub characteristics_table: Vec<CharacteristicRow>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub gallery_images: Vec<String>,
}

/// Entry appended to the detailed-index catalog for each detail record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailIndexEntry {
    pub name: String,
    pub detail_page_url: String,
    pub index_page_url: String,
    pub page_number: u32,
    pub detailed_filename: String,
    pub scraped_at: DateTime<Utc>,
}

/// Image provenance within a detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Main,
    Gallery,
}

impl ImageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageKind::Main => "main",
            ImageKind::Gallery => "gallery",
        }
    }
}
