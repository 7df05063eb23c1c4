//! Format and range predicates for primitive field values.
//!
//! Every validator is a pure boolean predicate; entity modules turn a
//! `false` into a [`CoreError::Validation`](crate::error::CoreError) with a
//! field-specific message.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum length (in characters) of a record name.
pub const MIN_NAME_LENGTH: usize = 3;

/// Minimum length of a client password.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// `YYYY-MM-DD`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// `YYYY-MM-DD HH:mm`
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-F]{6}$").expect("valid regex"));

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

static DATETIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}$").expect("valid regex"));

static CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d{2}$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Parse a literal `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if !DATE_RE.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Parse a literal `YYYY-MM-DD HH:mm` date and time.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    if !DATETIME_RE.is_match(value) {
        return None;
    }
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT).ok()
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Simple `text@text.text` shape.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// `#` followed by exactly six uppercase hex digits.
pub fn is_valid_color(value: &str) -> bool {
    COLOR_RE.is_match(value)
}

pub fn is_valid_name(value: &str) -> bool {
    value.chars().count() >= MIN_NAME_LENGTH
}

pub fn is_valid_date(value: &str) -> bool {
    parse_date(value).is_some()
}

pub fn is_valid_datetime(value: &str) -> bool {
    parse_datetime(value).is_some()
}

/// Both ends are valid dates and `end` is strictly after `start`.
pub fn is_valid_date_range(start: &str, end: &str) -> bool {
    match (parse_date(start), parse_date(end)) {
        (Some(s), Some(e)) => e > s,
        _ => false,
    }
}

/// Non-negative decimal string with exactly two fractional digits.
///
/// Amounts stay strings end to end so no floating point rounding is ever
/// applied to money.
pub fn is_valid_currency_amount(value: &str) -> bool {
    CURRENCY_RE.is_match(value)
}

/// `date` lies within `[start, end]`, inclusive on both ends. Returns
/// `false` if any of the three is not a valid date.
pub fn is_date_in_range(date: &str, start: &str, end: &str) -> bool {
    match (parse_date(date), parse_date(start), parse_date(end)) {
        (Some(d), Some(s), Some(e)) => s <= d && d <= e,
        _ => false,
    }
}

/// Postal address check. Free-text fields are accepted as-is; only the
/// mandatory parts must be non-blank.
pub fn is_valid_address(
    line1: &str,
    city: &str,
    state: &str,
    postal_code: &str,
    country: &str,
) -> bool {
    [line1, city, state, postal_code, country]
        .iter()
        .all(|part| !part.trim().is_empty())
}

pub fn is_valid_password(value: &str) -> bool {
    value.chars().count() >= MIN_PASSWORD_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- email --

    #[test]
    fn email_requires_at_and_dot() {
        assert!(is_valid_email("pastor@church.org"));
        assert!(!is_valid_email("pastor.church.org"));
        assert!(!is_valid_email("pastor@church"));
        assert!(!is_valid_email("pas tor@church.org"));
    }

    // -- color --

    #[test]
    fn color_requires_uppercase_six_digit_hex() {
        assert!(is_valid_color("#B3BFB8"));
        assert!(!is_valid_color("#b3bfb8"));
        assert!(!is_valid_color("B3BFB8"));
        assert!(!is_valid_color("#B3BFB"));
        assert!(!is_valid_color("#B3BFB8A"));
    }

    // -- name --

    #[test]
    fn name_boundary_is_three_characters() {
        assert!(!is_valid_name("Al"));
        assert!(is_valid_name("Ana"));
        assert!(is_valid_name("Smith Family"));
    }

    // -- dates --

    #[test]
    fn date_must_be_literal_calendar_date() {
        assert!(is_valid_date("2024-02-29"));
        assert!(!is_valid_date("2023-02-29"));
        assert!(!is_valid_date("2024-2-9"));
        assert!(!is_valid_date("2024-02-01T00:00"));
    }

    #[test]
    fn datetime_requires_minute_precision() {
        assert!(is_valid_datetime("2024-06-01 18:30"));
        assert!(!is_valid_datetime("2024-06-01 18:30:00"));
        assert!(!is_valid_datetime("2024-06-01"));
        assert!(!is_valid_datetime("2024-06-01 25:00"));
    }

    #[test]
    fn date_range_end_must_follow_start() {
        assert!(is_valid_date_range("2024-01-01", "2024-12-31"));
        assert!(!is_valid_date_range("2024-01-01", "2024-01-01"));
        assert!(!is_valid_date_range("2024-12-31", "2024-01-01"));
        assert!(!is_valid_date_range("2024-01-01", "not-a-date"));
    }

    #[test]
    fn date_in_range_is_inclusive() {
        assert!(is_date_in_range("2024-01-01", "2024-01-01", "2024-01-31"));
        assert!(is_date_in_range("2024-01-31", "2024-01-01", "2024-01-31"));
        assert!(!is_date_in_range("2024-02-01", "2024-01-01", "2024-01-31"));
    }

    // -- currency --

    #[test]
    fn currency_requires_two_fraction_digits() {
        assert!(is_valid_currency_amount("25.00"));
        assert!(is_valid_currency_amount("0.99"));
        assert!(!is_valid_currency_amount("25"));
        assert!(!is_valid_currency_amount("25.0"));
        assert!(!is_valid_currency_amount("25.001"));
        assert!(!is_valid_currency_amount("-5.00"));
    }

    // -- address --

    #[test]
    fn address_rejects_blank_mandatory_parts() {
        assert!(is_valid_address("1 Main St", "Springfield", "IL", "62701", "US"));
        assert!(!is_valid_address("  ", "Springfield", "IL", "62701", "US"));
    }
}
