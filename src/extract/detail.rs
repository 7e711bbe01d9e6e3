//! Detail extractor: one detail page -> one `DetailRecord`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::Utc;
use scraper::{ElementRef, Html, Selector};

use super::{collapsed_text, resolve_href};
use crate::models::{CharacteristicRow, DetailRecord, StructuredField};

static PAGE_CONTENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#page-content-inner").unwrap());
static FIELD_MARKED: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[class*="field-"]"#).unwrap());
static FIELD_LABEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".field-label").unwrap());
static LABEL_TAG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("label").unwrap());
static FIELD_ITEMS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".field-items").unwrap());
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static TABLE_ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static TABLE_CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static IMAGE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static GALLERY_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".gallery-item a").unwrap());

/// Free-text description selectors, scanned in priority order; the first
/// one yielding any paragraph text wins.
static DESCRIPTION_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        ".content-text p",
        r#"div[class*="description"] p"#,
        "article p",
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});

/// Extract the rich record from a detail page.
///
/// A page without the expected content container yields `None`; the
/// caller logs it and the crawl moves on.
pub fn extract_detail(
    html: &Html,
    detail_page_url: &str,
    missile_name: &str,
    index_page_url: &str,
    page_number: u32,
) -> Option<DetailRecord> {
    let content = html.select(&PAGE_CONTENT).next()?;

    let mut record = DetailRecord {
        missile_name: missile_name.to_string(),
        detail_page_url: detail_page_url.to_string(),
        index_page_url: index_page_url.to_string(),
        page_number,
        scraped_at: Utc::now(),
        structured_content: BTreeMap::new(),
        description: None,
        characteristics_table: Vec::new(),
        image_urls: Vec::new(),
        gallery_images: Vec::new(),
    };

    // Step 1: every element carrying a field-class marker becomes a
    // structured field, keyed by the marker with the prefix stripped.
    for element in content.select(&FIELD_MARKED) {
        let Some(field_name) = field_name_of(element) else {
            continue;
        };
        record
            .structured_content
            .insert(field_name, extract_field(element, detail_page_url));
    }

    // Step 2: free-text description.
    record.description = extract_description(content);

    // Step 3: tabular characteristics.
    for table in content.select(&TABLE) {
        for row in table.select(&TABLE_ROW) {
            let cells: Vec<ElementRef<'_>> = row.select(&TABLE_CELL).collect();
            if cells.len() < 2 {
                continue;
            }
            let field_name = collapsed_text(cells[0]);
            let field_value = collapsed_text(cells[1]);
            if field_name.is_empty() || field_value.is_empty() {
                continue;
            }
            record.characteristics_table.push(CharacteristicRow {
                field_name,
                field_value,
            });
        }
    }

    // Step 4: image harvesting.
    record.image_urls = content
        .select(&IMAGE)
        .filter_map(|img| img.value().attr("src"))
        .filter_map(|src| resolve_href(detail_page_url, src))
        .collect();
    record.gallery_images = content
        .select(&GALLERY_LINK)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve_href(detail_page_url, href))
        .collect();

    Some(record)
}

/// Derive the field name from the first `field-*` class on an element.
fn field_name_of(element: ElementRef<'_>) -> Option<String> {
    element
        .value()
        .classes()
        .find(|c| c.starts_with("field-") && *c != "field")
        .map(|c| c.trim_start_matches("field-").replace('-', "_"))
}

/// Extract label, body text, and links for one field element.
fn extract_field(element: ElementRef<'_>, page_url: &str) -> StructuredField {
    let label = element
        .select(&FIELD_LABEL)
        .next()
        .or_else(|| element.select(&LABEL_TAG).next())
        .map(collapsed_text)
        .unwrap_or_default();

    let mut field = StructuredField {
        label,
        ..Default::default()
    };

    if let Some(items) = element.select(&FIELD_ITEMS).next() {
        field.text = collapsed_text(items);
        for link in items.select(&LINK) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let Some(url) = resolve_href(page_url, href) else {
                continue;
            };
            // links mirrors urls on purpose; see StructuredField docs.
            field.links.push(url.clone());
            field.urls.push(url);
        }
    } else {
        field.text = collapsed_text(element);
    }

    field
}

/// First non-empty set of paragraph texts, joined by single spaces.
fn extract_description(content: ElementRef<'_>) -> Option<String> {
    for selector in DESCRIPTION_SELECTORS.iter() {
        let parts: Vec<String> = content
            .select(selector)
            .map(collapsed_text)
            .filter(|t| !t.is_empty())
            .collect();
        if !parts.is_empty() {
            return Some(parts.join(" "));
        }
    }
    None
}
