//! Jalali (Solar Hijri) to Gregorian date conversion.
//!
//! Only the one direction needed for the deadline column is provided.

use chrono::NaiveDate;

use crate::error::DateParseError;
use crate::util::fold_digits;

/// Offset between the arithmetic day count below and chrono's
/// days-from-CE numbering.
const CE_OFFSET: i64 = 365;

/// Convert a `year/month/day` Jalali date string into a Gregorian date.
///
/// Persian and Arabic-Indic digits are accepted, parts are trimmed, and `-`
/// may stand in for `/`. Every failure mode is reported as a
/// [`DateParseError`]; this function never panics.
pub fn jalali_to_gregorian(s: &str) -> Result<NaiveDate, DateParseError> {
    let folded = fold_digits(s.trim());
    if folded.is_empty() {
        return Err(DateParseError::Empty);
    }
    let parts: Vec<&str> = folded.split(['/', '-']).map(str::trim).collect();
    if parts.len() != 3 {
        return Err(DateParseError::WrongTokenCount(parts.len()));
    }
    let number = |p: &str| -> Result<u32, DateParseError> {
        p.parse::<u32>()
            .map_err(|_| DateParseError::NonNumeric(p.to_string()))
    };
    let (year, month, day) = (number(parts[0])?, number(parts[1])?, number(parts[2])?);
    let year = i32::try_from(year).map_err(|_| DateParseError::NonNumeric(parts[0].to_string()))?;
    from_jalali_ymd(year, month, day)
}

/// Convert numeric Jalali components, validating month and day ranges.
pub fn from_jalali_ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate, DateParseError> {
    let out_of_range = DateParseError::OutOfRange { year, month, day };
    if !(1..=9999).contains(&year) || !(1..=12).contains(&month) || day == 0 {
        return Err(out_of_range);
    }
    if day > month_length(year, month) {
        return Err(out_of_range);
    }
    NaiveDate::from_num_days_from_ce_opt((day_number(year, month, day) - CE_OFFSET) as i32)
        .ok_or(out_of_range)
}

/// Number of days in a Jalali month. Esfand's length is measured directly
/// from the day count so leap years follow the same arithmetic as the
/// conversion itself.
fn month_length(year: i32, month: u32) -> u32 {
    match month {
        1..=6 => 31,
        7..=11 => 30,
        _ => (day_number(year + 1, 1, 1) - day_number(year, 12, 1)) as u32,
    }
}

/// Absolute day count for a Jalali date (33-year cycle arithmetic).
fn day_number(year: i32, month: u32, day: u32) -> i64 {
    let jy = i64::from(year) + 1595;
    let month = i64::from(month);
    let month_days = if month < 7 {
        (month - 1) * 31
    } else {
        (month - 7) * 30 + 186
    };
    -355_668 + 365 * jy + (jy / 33) * 8 + ((jy % 33) + 3) / 4 + i64::from(day) + month_days
}
