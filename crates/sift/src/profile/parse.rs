//! Raw string parsing shared by profiling and value coercion.

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

// Date patterns compiled once on first use.
static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}").unwrap(),   // ISO date
        Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}").unwrap(),   // US date
        Regex::new(r"^\d{1,2}-\d{1,2}-\d{4}").unwrap(),   // European date
        Regex::new(r"^\d{4}/\d{1,2}/\d{1,2}").unwrap(),   // Alt ISO
    ]
});

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Check if a value represents a missing/null value.
pub fn is_null_value(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("n/a")
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed.eq_ignore_ascii_case("nil")
        || trimmed == "."
        || trimmed == "-"
}

/// Parse a boolean literal (`true`/`false`, any case).
pub fn parse_bool(value: &str) -> Option<bool> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Parse a finite number.
pub fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Parse a date or date-time. Dates without a time land on midnight.
pub fn parse_temporal(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if !DATE_PATTERNS.iter().any(|pattern| pattern.is_match(trimmed)) {
        return None;
    }

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_null_value() {
        assert!(is_null_value(""));
        assert!(is_null_value("NA"));
        assert!(is_null_value("n/a"));
        assert!(is_null_value("NULL"));
        assert!(is_null_value("."));
        assert!(!is_null_value("value"));
        assert!(!is_null_value("0"));
    }

    #[test]
    fn test_parse_number_rejects_non_finite() {
        assert_eq!(parse_number(" 5.1 "), Some(5.1));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("abc"), None);
    }

    #[test]
    fn test_parse_temporal_formats() {
        assert!(parse_temporal("2014-09-01").is_some());
        assert!(parse_temporal("2014-09-01 00:01:00").is_some());
        assert!(parse_temporal("9/1/2014 0:01:00").is_some());
        assert!(parse_temporal("09/01/2014").is_some());
        assert!(parse_temporal("10:00").is_none());
        assert!(parse_temporal("setosa").is_none());
    }
}
