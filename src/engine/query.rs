//! Best-effort extraction of structured filters from free-text searches.
//!
//! Deliberately heuristic rather than a grammar: patterns that fail to
//! match are omitted from the result, and no input ever produces an error.

use super::domain::SearchFilters;
use regex::Regex;
use std::sync::OnceLock;

fn max_rent_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\bunder\s*\$?\s*([0-9][0-9,]*)").expect("hardcoded pattern compiles")
    })
}

fn bedrooms_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b([0-9]{1,2})\s*(?:bed(?:room)?s?|bhk|br)\b")
            .expect("hardcoded pattern compiles")
    })
}

fn city_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\bin\s+([a-z][a-z\s.'-]*)").expect("hardcoded pattern compiles")
    })
}

/// Keywords that terminate a trailing city phrase.
const CITY_STOP_WORDS: [&str; 5] = ["under", "below", "with", "for", "near"];

/// Parses a free-text query into structured filters. First occurrence wins
/// for every pattern; unmatched fields are simply absent.
pub fn parse_query(query: &str) -> SearchFilters {
    let mut filters = SearchFilters::default();

    if let Some(captures) = max_rent_pattern().captures(query) {
        let digits: String = captures[1].chars().filter(char::is_ascii_digit).collect();
        // Non-numeric or overflowing captures are dropped, never NaN-style
        // propagated.
        filters.max_rent = digits.parse::<u32>().ok();
    }

    if let Some(captures) = bedrooms_pattern().captures(query) {
        filters.bedrooms = captures[1].parse::<u8>().ok();
    }

    if let Some(captures) = city_pattern().captures(query) {
        filters.city = trim_city_phrase(&captures[1]);
    }

    filters
}

fn trim_city_phrase(raw: &str) -> Option<String> {
    let mut words: Vec<&str> = Vec::new();
    for word in raw.split_whitespace() {
        let bare = word.trim_matches(|c: char| !c.is_alphanumeric());
        if CITY_STOP_WORDS
            .iter()
            .any(|stop| bare.eq_ignore_ascii_case(stop))
        {
            break;
        }
        words.push(word);
    }

    let city = words
        .join(" ")
        .trim_matches(|c: char| c == ',' || c == '.' || c.is_whitespace())
        .to_string();
    (!city.is_empty()).then_some(city)
}
