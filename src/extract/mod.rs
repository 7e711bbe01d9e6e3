//! Pure HTML-to-record extraction.
//!
//! Everything in this module is a synchronous transform from a parsed
//! fragment to a record (or nothing). No network I/O happens here; the
//! crawl runner owns fetching.

mod card;
mod detail;
pub mod fields;
mod pagination;

pub use card::{extract_card, extract_cards};
pub use detail::extract_detail;
pub use pagination::{
    discover_max_page, discover_page_ordinals, listing_page_url, listing_pages, page_ordinal_of,
};

use url::Url;

/// Resolve an href against the page it appeared on.
///
/// Absolute URLs pass through; anything else is joined against the base.
/// Unresolvable hrefs yield `None` (an extraction miss, not an error).
pub(crate) fn resolve_href(page_url: &str, href: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    Url::parse(page_url)
        .ok()
        .and_then(|base| base.join(href).ok())
        .map(|u| u.to_string())
}

/// Collect an element's text nodes, trimmed and joined by single spaces.
pub(crate) fn collapsed_text(element: scraper::ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_hrefs() {
        assert_eq!(
            resolve_href("https://missilery.info/search?page=3", "/missile/topol").as_deref(),
            Some("https://missilery.info/missile/topol")
        );
        assert_eq!(
            resolve_href("https://missilery.info/search", "https://example.com/x").as_deref(),
            Some("https://example.com/x")
        );
    }
}
