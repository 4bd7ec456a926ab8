//! Time helpers - business time zone conversion
//!
//! Date to timestamp conversion happens at the API layer;
//! repositories only see `i64` Unix millis.

use chrono::{Datelike, NaiveDate, NaiveTime};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// Parse an IANA time zone name, falling back to UTC
pub fn parse_timezone(name: &str) -> Tz {
    name.parse::<Tz>().unwrap_or_else(|_| {
        tracing::warn!("Unknown TIMEZONE '{}', falling back to UTC", name);
        Tz::UTC
    })
}

/// First day of a month, validating year and month
pub fn month_start(year: i32, month: u32) -> AppResult<NaiveDate> {
    if !(1..=12).contains(&month) {
        return Err(AppError::invalid_field(
            "month",
            format!("Month must be between 1 and 12, got {month}"),
        ));
    }
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::invalid_field("year", format!("Invalid year: {year}")))
}

/// First day of the month after the given one
pub fn next_month_start(date: NaiveDate) -> AppResult<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    month_start(year, month)
}

/// Date at local midnight → Unix millis (business time zone)
///
/// DST gap fallback: if local midnight does not exist, fall back to UTC.
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    let naive = date.and_time(NaiveTime::MIN);
    naive
        .and_local_timezone(tz)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Half-open `[start, end)` millis covering whole months
///
/// `end` is the first instant of the month after `(end_year, end_month)`.
/// An inverted range is returned as is; callers get no rows for it.
pub fn month_range_millis(
    start_year: i32,
    start_month: u32,
    end_year: i32,
    end_month: u32,
    tz: Tz,
) -> AppResult<(i64, i64)> {
    let start = month_start(start_year, start_month)?;
    let end = next_month_start(month_start(end_year, end_month)?)?;
    Ok((day_start_millis(start, tz), day_start_millis(end, tz)))
}
