// CaseAlert - core/dates.rs
//
// Best-effort date parsing for table cells. A cell that cannot be parsed
// becomes `None`; this module never returns an error.
// Core layer: pure logic, no I/O.

use crate::util::constants;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Outcome of parsing one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateCell {
    /// The cell was empty or an explicit null literal.
    Blank,
    /// The cell parsed to a date.
    Parsed(NaiveDate),
    /// The cell had content that no known format accepted.
    Unparsed,
}

impl DateCell {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DateCell::Parsed(d) => Some(*d),
            _ => None,
        }
    }
}

/// Ordered list of formats tried for each cell.
#[derive(Debug, Clone)]
pub struct DateParser {
    /// User formats from `[input] date_formats`, tried first.
    user_formats: Vec<String>,
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl DateParser {
    pub fn new(user_formats: Vec<String>) -> Self {
        Self { user_formats }
    }

    /// Parse a raw cell.
    ///
    /// Strategy:
    ///   1. Blank / null literal (`NaT`, `nan`, ...) -> `Blank`.
    ///   2. User formats, as date then as date-time.
    ///   3. Built-in date-only formats.
    ///   4. Built-in date-time formats (time part discarded).
    ///   5. RFC 3339 with offset (date part of the local reading).
    pub fn parse(&self, raw: &str) -> DateCell {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || constants::NULL_DATE_LITERALS
                .iter()
                .any(|lit| trimmed.eq_ignore_ascii_case(lit))
        {
            return DateCell::Blank;
        }

        let user = self
            .user_formats
            .iter()
            .find_map(|format| try_format(trimmed, format).filter(plausible));
        if let Some(d) = user {
            return DateCell::Parsed(d);
        }

        let builtin_date = constants::BUILTIN_DATE_FORMATS.iter().find_map(|format| {
            NaiveDate::parse_from_str(trimmed, format)
                .ok()
                .filter(plausible)
        });
        if let Some(d) = builtin_date {
            return DateCell::Parsed(d);
        }

        let builtin_datetime = constants::BUILTIN_DATETIME_FORMATS.iter().find_map(|format| {
            NaiveDateTime::parse_from_str(trimmed, format)
                .ok()
                .map(|ndt| ndt.date())
                .filter(plausible)
        });
        if let Some(d) = builtin_datetime {
            return DateCell::Parsed(d);
        }

        if let Some(d) = DateTime::parse_from_rfc3339(trimmed)
            .ok()
            .map(|dt| dt.date_naive())
            .filter(plausible)
        {
            return DateCell::Parsed(d);
        }

        tracing::debug!(raw = trimmed, "Unparseable date cell treated as absent");
        DateCell::Unparsed
    }
}

/// Reject years with fewer than four digits.
fn plausible(date: &NaiveDate) -> bool {
    date.year() >= constants::MIN_PLAUSIBLE_YEAR
}

/// Try one format as a date, then as a date-time.
fn try_format(raw: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, format)
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, format)
                .ok()
                .map(|ndt| ndt.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(DateParser::default().parse("2024-01-15"), DateCell::Parsed(ymd(2024, 1, 15)));
    }

    #[test]
    fn test_day_first_slash_date() {
        assert_eq!(DateParser::default().parse("15/01/2024"), DateCell::Parsed(ymd(2024, 1, 15)));
    }

    #[test]
    fn test_datetime_truncated_to_date() {
        let p = DateParser::default();
        assert_eq!(p.parse("2024-03-05 14:30:00"), DateCell::Parsed(ymd(2024, 3, 5)));
        assert_eq!(p.parse("2024-03-05T14:30:00"), DateCell::Parsed(ymd(2024, 3, 5)));
        assert_eq!(p.parse("2024-03-05T14:30:00+02:00"), DateCell::Parsed(ymd(2024, 3, 5)));
    }

    #[test]
    fn test_blank_and_null_literals() {
        let p = DateParser::default();
        assert_eq!(p.parse(""), DateCell::Blank);
        assert_eq!(p.parse("   "), DateCell::Blank);
        assert_eq!(p.parse("NaT"), DateCell::Blank);
        assert_eq!(p.parse("nan"), DateCell::Blank);
    }

    #[test]
    fn test_garbage_is_unparsed_not_error() {
        let p = DateParser::default();
        assert_eq!(p.parse("not a date"), DateCell::Unparsed);
        assert_eq!(p.parse("2024-13-45"), DateCell::Unparsed);
        assert_eq!(p.parse("31/02/2024").date(), None);
    }

    #[test]
    fn test_two_digit_year_is_read_day_first_not_as_first_century() {
        let p = DateParser::default();
        assert_eq!(p.parse("01/08/24"), DateCell::Parsed(ymd(2024, 8, 1)));
        assert_eq!(p.parse("25/09/24"), DateCell::Parsed(ymd(2024, 9, 25)));
        assert_eq!(p.parse("25-09-24"), DateCell::Parsed(ymd(2024, 9, 25)));
    }

    #[test]
    fn test_short_year_never_parses_below_plausible_range() {
        let p = DateParser::default();
        for raw in ["1/2/3", "0024-01-01", "24/1/1"] {
            if let Some(d) = p.parse(raw).date() {
                assert!(d.year() >= constants::MIN_PLAUSIBLE_YEAR, "{raw} -> {d}");
            }
        }
        // A user format using %Y is held to the same floor.
        let user = DateParser::new(vec!["%Y|%m|%d".to_string()]);
        assert_eq!(user.parse("24|09|25"), DateCell::Unparsed);
    }

    #[test]
    fn test_user_format_takes_priority() {
        // "01/02/2024" is 1 Feb under the built-in day-first format,
        // 2 Jan under a month-first user format.
        let p = DateParser::new(vec!["%m/%d/%Y".to_string()]);
        assert_eq!(p.parse("01/02/2024"), DateCell::Parsed(ymd(2024, 1, 2)));
        assert_eq!(DateParser::default().parse("01/02/2024"), DateCell::Parsed(ymd(2024, 2, 1)));
    }
}
