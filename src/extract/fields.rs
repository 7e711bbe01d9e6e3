//! Declarative extraction rules for listing cards.
//!
//! The catalog site labels card attributes with a fixed vocabulary of
//! abbreviations. Keeping the label -> field mapping as data means new
//! vocabularies can be added without touching extraction control flow.

use std::sync::LazyLock;

use regex::Regex;

/// Semantic fields a labeled card group can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    Base,
    Purpose,
    Warhead,
    GuidanceSystem,
    Country,
}

/// Label vocabulary observed on the listing cards.
///
/// The guidance label really does use a Latin `C` on the site; do not
/// "fix" it to the Cyrillic С.
pub const CARD_FIELD_LABELS: &[(&str, CardField)] = &[
    ("Баз.", CardField::Base),
    ("Наз.", CardField::Purpose),
    ("Б/Ч.", CardField::Warhead),
    ("C/У.", CardField::GuidanceSystem),
    ("Стр.", CardField::Country),
];

/// Range in the card footer: digits followed by the distance marker.
pub static RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*км\.").unwrap());

/// Development year in the card footer: four digits followed by the year
/// marker.
pub static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})\s*г\.").unwrap());

/// First range match in a footer text, if any.
pub fn parse_range_km(text: &str) -> Option<i32> {
    RANGE_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// First year match in a footer text, if any.
pub fn parse_year(text: &str) -> Option<i32> {
    YEAR_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footer_patterns_take_first_match() {
        let text = "Дальность 500 км. 1975 г. испытания, 800 км. вариант";
        assert_eq!(parse_range_km(text), Some(500));
        assert_eq!(parse_year(text), Some(1975));
    }

    #[test]
    fn footer_patterns_miss_cleanly() {
        assert_eq!(parse_range_km("нет данных"), None);
        assert_eq!(parse_year("500 км."), None);
        // Year marker required; a bare four-digit number is not a year
        assert_eq!(parse_year("изделие 8К14"), None);
    }
}
