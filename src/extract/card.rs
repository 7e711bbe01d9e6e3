//! Card extractor: one listing-entry fragment -> one `BasicRecord`.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::fields::{parse_range_km, parse_year, CardField, CARD_FIELD_LABELS};
use super::{collapsed_text, resolve_href};
use crate::models::BasicRecord;

static CARD: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".card").unwrap());
static HEADING_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2 a").unwrap());
static FIELD_LABEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".field-label").unwrap());
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static CARD_FOOTER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".card-footer").unwrap());

/// Extract every valid card on a listing page.
pub fn extract_cards(html: &Html, index_page_url: &str, page_number: u32) -> Vec<BasicRecord> {
    html.select(&CARD)
        .filter_map(|card| extract_card(card, index_page_url, page_number))
        .collect()
}

/// Extract a single listing card.
///
/// A card without a usable heading name (or detail link) is invalid and
/// yields `None`; everything else degrades to absent optional fields.
pub fn extract_card(
    card: ElementRef<'_>,
    index_page_url: &str,
    page_number: u32,
) -> Option<BasicRecord> {
    let heading = card.select(&HEADING_LINK).next()?;
    let name = collapsed_text(heading);
    if name.is_empty() {
        return None;
    }
    let detail_page_url = heading
        .value()
        .attr("href")
        .and_then(|href| resolve_href(index_page_url, href))?;

    let mut record = BasicRecord {
        name,
        detail_page_url,
        index_page_url: index_page_url.to_string(),
        page_number,
        base: None,
        purpose: None,
        warhead: None,
        guidance_system: None,
        country: None,
        range_km: None,
        year_developed: None,
        description: String::new(),
        is_detailed: false,
    };

    // Labeled attribute groups, matched against the fixed vocabulary.
    for label in card.select(&FIELD_LABEL) {
        let label_text = collapsed_text(label);
        let Some((_, field)) = CARD_FIELD_LABELS
            .iter()
            .find(|(marker, _)| *marker == label_text)
        else {
            continue;
        };
        let Some(value) = labeled_group_value(label) else {
            continue;
        };
        match field {
            CardField::Base => record.base = Some(value),
            CardField::Purpose => record.purpose = Some(value),
            CardField::Warhead => record.warhead = Some(value),
            CardField::GuidanceSystem => record.guidance_system = Some(value),
            CardField::Country => record.country = Some(value),
        }
    }

    // Footer text carries range and development year; first match wins.
    if let Some(footer) = card.select(&CARD_FOOTER).next() {
        let footer_text = collapsed_text(footer);
        record.range_km = parse_range_km(&footer_text);
        record.year_developed = parse_year(&footer_text);
    }

    Some(record)
}

/// Join the link texts of the `.field-items` sibling following a label.
///
/// Multi-valued groups are joined with ", "; an empty group counts as an
/// extraction miss.
fn labeled_group_value(label: ElementRef<'_>) -> Option<String> {
    let items = label
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().classes().any(|c| c == "field-items"))?;

    let values: Vec<String> = items
        .select(&LINK)
        .map(collapsed_text)
        .filter(|t| !t.is_empty())
        .collect();
    if values.is_empty() {
        return None;
    }
    Some(values.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_URL: &str = "https://missilery.info/search?page=1";

    fn card_html(body: &str) -> Html {
        Html::parse_fragment(&format!("<div class=\"card\">{}</div>", body))
    }

    fn first_card(html: &Html) -> ElementRef<'_> {
        html.select(&CARD).next().unwrap()
    }

    #[test]
    fn extracts_name_and_detail_link() {
        let html = card_html(
            r#"<h2><a href="/missile/topol-m">Тополь-М</a></h2>
               <div class="card-body"></div>"#,
        );
        let record = extract_card(first_card(&html), LISTING_URL, 2).unwrap();
        assert_eq!(record.name, "Тополь-М");
        assert_eq!(
            record.detail_page_url,
            "https://missilery.info/missile/topol-m"
        );
        assert_eq!(record.page_number, 2);
        assert!(!record.is_detailed);
    }

    #[test]
    fn card_without_name_is_discarded() {
        let html = card_html(r#"<h2><a href="/missile/x"> </a></h2>"#);
        assert!(extract_card(first_card(&html), LISTING_URL, 1).is_none());

        let html = card_html(r#"<div class="card-body">no heading at all</div>"#);
        assert!(extract_card(first_card(&html), LISTING_URL, 1).is_none());
    }

    #[test]
    fn labeled_groups_join_link_texts() {
        let html = card_html(
            r#"<h2><a href="/missile/kh-55">Х-55</a></h2>
               <div class="card-body">
                 <div class="field-label">Стр.</div>
                 <div class="field-items"><a href="/c/ussr">СССР</a><a href="/c/ru">Россия</a></div>
                 <div class="field-label">Наз.</div>
                 <div class="field-items"><a href="/p/strat">стратегический</a></div>
                 <div class="field-label">Нет.</div>
                 <div class="field-items"><a href="/x">ignored</a></div>
               </div>"#,
        );
        let record = extract_card(first_card(&html), LISTING_URL, 1).unwrap();
        assert_eq!(record.country.as_deref(), Some("СССР, Россия"));
        assert_eq!(record.purpose.as_deref(), Some("стратегический"));
        assert_eq!(record.base, None);
        assert_eq!(record.warhead, None);
    }

    #[test]
    fn footer_yields_range_and_year() {
        let html = card_html(
            r#"<h2><a href="/missile/r-17">Р-17</a></h2>
               <div class="card-footer">300 км. 1962 г.</div>"#,
        );
        let record = extract_card(first_card(&html), LISTING_URL, 1).unwrap();
        assert_eq!(record.range_km, Some(300));
        assert_eq!(record.year_developed, Some(1962));
    }

    #[test]
    fn extract_cards_skips_non_missile_cards() {
        let html = Html::parse_fragment(
            r#"<div class="card"><h2><a href="/missile/a">A</a></h2></div>
               <div class="card"><p>advertisement</p></div>
               <div class="card"><h2><a href="/missile/b">B</a></h2></div>"#,
        );
        let records = extract_cards(&html, LISTING_URL, 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "A");
        assert_eq!(records[1].name, "B");
    }
}
