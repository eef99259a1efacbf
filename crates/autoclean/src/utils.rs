//! Shared parsing and text helpers.
//!
//! Both the inference engine and the repair stages rely on the same notion
//! of "parses as a number" and "parses as a date", so those rules live here.

use crate::table::CellValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

// =============================================================================
// Numbers
// =============================================================================

// Optional sign, digits with an optional decimal point (or a leading point),
// optional exponent. Deliberately rejects "inf", "NaN" and separators.
static NUMERIC_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$")
        .expect("Invalid regex: numeric literal")
});

/// Parse a numeric literal, ignoring surrounding whitespace.
///
/// ```rust,ignore
/// assert_eq!(parse_number(" -2.5 "), Some(-2.5));
/// assert_eq!(parse_number("1,000"), None);
/// ```
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if !NUMERIC_LITERAL.is_match(trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Finite numeric value of a cell: numbers directly, text when it parses.
pub fn cell_as_number(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(n) => Some(*n).filter(|n| n.is_finite()),
        CellValue::Text(s) => parse_number(s),
        _ => None,
    }
}

// =============================================================================
// Dates
// =============================================================================

/// Date-only formats, most common first. Month-first slashes win over
/// day-first ones, so `01/05/2023` is January 5th.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%d-%b-%Y",
    "%d-%B-%Y",
];

/// Date-time formats; the time part is dropped after parsing.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parse a calendar date from text using a permissive set of formats.
///
/// Accepts ISO dates, slash/dot/dash separated dates, month names,
/// date-times with `T` or space separators, and RFC 3339 timestamps.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Calendar date of a cell: dates directly, text when it parses.
pub fn cell_as_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::Text(s) => parse_date(s),
        _ => None,
    }
}

// =============================================================================
// Text
// =============================================================================

/// Title-case a string: a letter that follows a non-letter (or starts the
/// string) is uppercased, every other letter is lowercased.
///
/// ```rust,ignore
/// assert_eq!(title_case("new YORK"), "New York");
/// assert_eq!(title_case("o'neil-smith"), "O'Neil-Smith");
/// ```
pub fn title_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_is_letter = false;

    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                result.extend(ch.to_lowercase());
            } else {
                result.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            result.push(ch);
            prev_is_letter = false;
        }
    }

    result
}

/// Pluralize a noun for log messages.
pub(crate) fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_accepts_literals() {
        assert_eq!(parse_number("25"), Some(25.0));
        assert_eq!(parse_number("-3.5"), Some(-3.5));
        assert_eq!(parse_number("+4."), Some(4.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("  42  "), Some(42.0));
    }

    #[test]
    fn test_parse_number_rejects_non_literals() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("1,000"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("$5"), None);
        assert_eq!(parse_number("2023-01-05"), None);
    }

    #[test]
    fn test_cell_as_number_skips_non_finite_numbers() {
        assert_eq!(cell_as_number(&CellValue::Number(2.5)), Some(2.5));
        assert_eq!(cell_as_number(&CellValue::Number(f64::NAN)), None);
        assert_eq!(cell_as_number(&CellValue::Number(f64::NEG_INFINITY)), None);
        assert_eq!(cell_as_number(&CellValue::Text("1e999".into())), None);
    }

    #[test]
    fn test_parse_date_iso_and_slashes() {
        let jan5 = NaiveDate::from_ymd_opt(2023, 1, 5);
        assert_eq!(parse_date("2023-01-05"), jan5);
        assert_eq!(parse_date("2023/01/05"), jan5);
        assert_eq!(parse_date("01/05/2023"), jan5);
        assert_eq!(parse_date(" 2023-1-5 "), jan5);
    }

    #[test]
    fn test_parse_date_day_first_when_unambiguous() {
        assert_eq!(parse_date("25/12/2023"), NaiveDate::from_ymd_opt(2023, 12, 25));
        assert_eq!(parse_date("25.12.2023"), NaiveDate::from_ymd_opt(2023, 12, 25));
    }

    #[test]
    fn test_parse_date_month_names() {
        let jan5 = NaiveDate::from_ymd_opt(2023, 1, 5);
        assert_eq!(parse_date("Jan 5, 2023"), jan5);
        assert_eq!(parse_date("January 5, 2023"), jan5);
        assert_eq!(parse_date("5 January 2023"), jan5);
        assert_eq!(parse_date("05-Jan-2023"), jan5);
    }

    #[test]
    fn test_parse_date_with_time() {
        let feb10 = NaiveDate::from_ymd_opt(2023, 2, 10);
        assert_eq!(parse_date("2023-02-10T14:30:00"), feb10);
        assert_eq!(parse_date("2023-02-10 14:30:00.123"), feb10);
        assert_eq!(parse_date("2023-02-10 14:30"), feb10);
        assert_eq!(parse_date("2023-02-10T14:30:00+02:00"), feb10);
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date("not-a-date"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2023-13-45"), None);
        assert_eq!(parse_date("hello world"), None);
    }

    #[test]
    fn test_cell_helpers() {
        assert_eq!(cell_as_number(&CellValue::Text("7".into())), Some(7.0));
        assert_eq!(cell_as_number(&CellValue::Absent), None);
        assert!(cell_as_date(&CellValue::Number(20230105.0)).is_none());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("new york"), "New York");
        assert_eq!(title_case("PARIS"), "Paris");
        assert_eq!(title_case("sAN fRANCISCO"), "San Francisco");
        assert_eq!(title_case("o'neil-smith"), "O'Neil-Smith");
        assert_eq!(title_case("3rd street"), "3Rd Street");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "value", "values"), "1 value");
        assert_eq!(plural(3, "value", "values"), "3 values");
    }
}
