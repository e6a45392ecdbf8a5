//! Calendar-day strings.
//!
//! Days are written as `D/M/YYYY` without leading zeros (`1/6/2024`). The
//! same string is the grouping key of a date bucket and the encoding of every
//! date field on a task.

use crate::error::{Error, Result};
use chrono::{Datelike, NaiveDate, NaiveTime};

/// Format a day as `D/M/YYYY`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.day(), date.month(), date.year())
}

/// Parse a `D/M/YYYY` string.
///
/// Leading zeros are tolerated (`01/06/2024`); days that do not exist on the
/// calendar are rejected.
///
/// # Errors
///
/// Returns [`Error::InvalidDate`] if the string is not a valid day.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let invalid = || Error::InvalidDate(s.to_string());

    let mut parts = s.trim().split('/');
    let (Some(day), Some(month), Some(year), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let day: u32 = day.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let year: i32 = year.parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Parse a due date as typed by a user or produced by a date picker.
///
/// Accepts `D/M/YYYY` or ISO `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns [`Error::InvalidDate`] if neither form matches.
pub fn parse_due_date(s: &str) -> Result<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.contains('-') {
        return NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map_err(|_| Error::InvalidDate(s.to_string()));
    }
    parse_date(trimmed)
}

/// True iff day `a` is strictly later than day `b`.
///
/// A string that does not parse never compares as later, and nothing compares
/// as later than it.
#[must_use]
pub fn is_after(a: &str, b: &str) -> bool {
    match (parse_date(a), parse_date(b)) {
        (Ok(a), Ok(b)) => a > b,
        _ => false,
    }
}

/// Format a clock time the way tasks display it: `hh:mm AM`.
#[must_use]
pub fn format_clock_time(time: NaiveTime) -> String {
    time.format("%I:%M %p").to_string()
}
