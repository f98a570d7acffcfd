// Utility helpers for parsing and formatting.
//
// This module centralizes the "dirty" spreadsheet cell handling (regional
// digits, mixed date layouts, float-looking integers) so the rest of the
// code can assume clean, typed values.
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use num_format::{Locale, ToFormattedString};

use crate::error::DateParseError;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y-%m-%d %I:%M %p",
    "%Y/%m/%d %I:%M:%S %p",
    "%Y/%m/%d %I:%M %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

/// Replace Persian (`۰`-`۹`) and Arabic-Indic (`٠`-`٩`) digits with ASCII
/// digits. Everything else is left untouched.
pub fn fold_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '۰'..='۹' => char::from(b'0' + (c as u32 - '۰' as u32) as u8),
            '٠'..='٩' => char::from(b'0' + (c as u32 - '٠' as u32) as u8),
            _ => c,
        })
        .collect()
}

/// Treat blank cells as missing.
pub fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}

/// Parse a count cell. Spreadsheet exports often write integers as `2.0`,
/// so a float with no fractional part is accepted too. Negative or
/// fractional values are rejected.
pub fn parse_u32_safe(s: Option<&str>) -> Option<u32> {
    let s = fold_digits(s?.trim());
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<u32>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) {
        Some(f as u32)
    } else {
        None
    }
}

/// Permissive timestamp parsing: RFC 3339, a handful of common
/// date-time layouts, and bare dates (read as midnight).
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, DateParseError> {
    let s = fold_digits(s.trim());
    if s.is_empty() {
        return Err(DateParseError::Empty);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Ok(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&s, fmt) {
            return Ok(dt);
        }
    }
    parse_date(&s)
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| DateParseError::Unrecognized(s))
}

pub fn parse_date(s: &str) -> Result<NaiveDate, DateParseError> {
    let s = fold_digits(s.trim());
    if s.is_empty() {
        return Err(DateParseError::Empty);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&s, fmt).ok())
        .ok_or(DateParseError::Unrecognized(s))
}

/// Parse a time-of-day cell. A full timestamp is accepted and reduced to
/// its time component.
pub fn parse_time(s: &str) -> Result<NaiveTime, DateParseError> {
    let s = fold_digits(s.trim());
    if s.is_empty() {
        return Err(DateParseError::Empty);
    }
    for fmt in TIME_FORMATS {
        if let Ok(t) = NaiveTime::parse_from_str(&s, fmt) {
            return Ok(t);
        }
    }
    parse_timestamp(&s)
        .map(|dt| dt.time())
        .map_err(|_| DateParseError::Unrecognized(s))
}

/// Format a ratio in `[0, 1]` as a percentage with two decimals.
pub fn format_percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for counts in console messages
    // (e.g., `1,204 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_regional_digits() {
        assert_eq!(fold_digits("۱۴۰۲/۰۱/۰۱"), "1402/01/01");
        assert_eq!(fold_digits("٣"), "3");
        assert_eq!(fold_digits("abc"), "abc");
    }

    #[test]
    fn counts_accept_float_integers() {
        assert_eq!(parse_u32_safe(Some("3")), Some(3));
        assert_eq!(parse_u32_safe(Some("2.0")), Some(2));
        assert_eq!(parse_u32_safe(Some("۴")), Some(4));
        assert_eq!(parse_u32_safe(Some("2.5")), None);
        assert_eq!(parse_u32_safe(Some("-1")), None);
        assert_eq!(parse_u32_safe(Some("  ")), None);
        assert_eq!(parse_u32_safe(None), None);
    }

    #[test]
    fn timestamps_are_permissive() {
        let expected = NaiveDate::from_ymd_opt(2023, 5, 4)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2023-05-04 18:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2023-05-04T18:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2023/05/04 18:30").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2023-05-04").unwrap(),
            expected.date().and_time(NaiveTime::MIN)
        );
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(DateParseError::Unrecognized(_))
        ));
        assert_eq!(parse_timestamp(""), Err(DateParseError::Empty));
    }

    #[test]
    fn times_accept_seconds_or_not() {
        assert_eq!(parse_time("18:00").unwrap(), NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        assert_eq!(
            parse_time("17:59:59").unwrap(),
            NaiveTime::from_hms_opt(17, 59, 59).unwrap()
        );
        assert_eq!(
            parse_time("2023-05-04 09:15:00").unwrap(),
            NaiveTime::from_hms_opt(9, 15, 0).unwrap()
        );
        assert!(parse_time("late").is_err());
    }

    #[test]
    fn twelve_hour_clock_layouts() {
        assert_eq!(parse_time("6:00 PM").unwrap(), NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        assert_eq!(
            parse_time("05:59:59 pm").unwrap(),
            NaiveTime::from_hms_opt(17, 59, 59).unwrap()
        );
        assert_eq!(parse_time("12:30 AM").unwrap(), NaiveTime::from_hms_opt(0, 30, 0).unwrap());
        assert_eq!(
            parse_timestamp("5/4/2023 6:15 PM").unwrap(),
            NaiveDate::from_ymd_opt(2023, 5, 4)
                .unwrap()
                .and_hms_opt(18, 15, 0)
                .unwrap()
        );
        assert_eq!(
            parse_timestamp("2023-05-04 07:00:00 AM").unwrap().time(),
            NaiveTime::from_hms_opt(7, 0, 0).unwrap()
        );
    }
}
