//! Pagination discovery for the listing catalog.
//!
//! The site paginates with a zero-based `?page=N` query parameter; the
//! bare search URL is ordinal 0. Discovery reads the maximum ordinal out
//! of the first page's pagination control so the full listing sequence can
//! be generated up front instead of chasing next-links page by page.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

static PAGE_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="page="]"#).unwrap());

static PAGE_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"page=(\d+)").unwrap());

/// Every page ordinal referenced by a rendered pagination control, in
/// document order (duplicates included; the frontier dedups).
pub fn discover_page_ordinals(html: &Html) -> Vec<u32> {
    html.select(&PAGE_LINK)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(page_ordinal_of)
        .collect()
}

/// Maximum page ordinal referenced by a rendered pagination control.
///
/// Returns `None` when no ordinal is discoverable; the caller falls back
/// to its configured ceiling.
pub fn discover_max_page(html: &Html) -> Option<u32> {
    discover_page_ordinals(html).into_iter().max()
}

/// Parse the zero-based page ordinal out of a listing href, if present.
pub fn page_ordinal_of(href: &str) -> Option<u32> {
    PAGE_PARAM_RE
        .captures(href)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Build the listing URL for a zero-based ordinal.
///
/// Ordinal 0 is the bare search URL so the generated locator matches the
/// start page the crawl already visited.
pub fn listing_page_url(search_url: &str, ordinal: u32) -> String {
    if ordinal == 0 {
        search_url.to_string()
    } else {
        format!("{}?page={}", search_url, ordinal)
    }
}

/// Generate the full listing sequence for ordinals `0..=ceiling`.
///
/// Returns (locator, page number) pairs; the stored page number is the
/// ordinal plus one.
pub fn listing_pages(search_url: &str, ceiling: u32) -> Vec<(String, u32)> {
    (0..=ceiling)
        .map(|ordinal| (listing_page_url(search_url, ordinal), ordinal + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH: &str = "https://missilery.info/search";

    #[test]
    fn finds_max_ordinal_in_pagination_control() {
        let html = Html::parse_fragment(
            r#"<ul class="pagination">
                 <li><a href="/search?page=0">1</a></li>
                 <li><a href="/search?page=3">4</a></li>
                 <li><a href="/search?page=7">последняя</a></li>
                 <li><a href="/about">about</a></li>
               </ul>"#,
        );
        assert_eq!(discover_max_page(&html), Some(7));
    }

    #[test]
    fn no_control_means_no_ordinal() {
        let html = Html::parse_fragment("<p>нет страниц</p>");
        assert_eq!(discover_max_page(&html), None);
    }

    #[test]
    fn ceiling_seven_generates_eight_pages() {
        let pages = listing_pages(SEARCH, 7);
        assert_eq!(pages.len(), 8);
        assert_eq!(pages[0], (SEARCH.to_string(), 1));
        assert_eq!(
            pages[7],
            ("https://missilery.info/search?page=7".to_string(), 8)
        );
        // Every generated locator is distinct
        let mut urls: Vec<&str> = pages.iter().map(|(u, _)| u.as_str()).collect();
        urls.dedup();
        assert_eq!(urls.len(), 8);
    }

    #[test]
    fn parses_ordinals_from_hrefs() {
        assert_eq!(page_ordinal_of("/search?page=12"), Some(12));
        assert_eq!(page_ordinal_of("https://missilery.info/search?page=0"), Some(0));
        assert_eq!(page_ordinal_of("/search"), None);
    }
}
