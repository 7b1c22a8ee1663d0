//! Epoch-second helpers for attendance dates and clock times.
//!
//! The backend exchanges dates as epoch seconds and clock times as
//! `HH:MM[:SS]` strings. Day boundaries are taken in UTC.

#[cfg(test)]
#[path = "time_test.rs"]
mod time_test;

use time::OffsetDateTime;
use time::macros::format_description;

use super::validate::ValidationError;

pub const DAY_SECS: i64 = 24 * 60 * 60;

/// Check-ins at or after this hour count as late.
pub const LATE_HOUR: u32 = 9;

/// Current time in epoch seconds.
pub fn now_epoch() -> i64 {
    #[cfg(feature = "hydrate")]
    {
        #[allow(clippy::cast_possible_truncation)]
        let secs = (js_sys::Date::now() / 1000.0) as i64;
        secs
    }
    #[cfg(not(feature = "hydrate"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
    }
}

/// Midnight (UTC) of the day containing `epoch`.
pub fn start_of_day(epoch: i64) -> i64 {
    epoch - epoch.rem_euclid(DAY_SECS)
}

/// Parse a `YYYY-MM-DD` form value into the epoch second of its midnight.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDate`] for anything that is not a
/// calendar date in that format.
pub fn parse_date(value: &str) -> Result<i64, ValidationError> {
    let format = format_description!("[year]-[month]-[day]");
    let date = time::Date::parse(value.trim(), &format).map_err(|_| ValidationError::InvalidDate)?;
    Ok(date.midnight().assume_utc().unix_timestamp())
}

fn to_datetime(epoch: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(epoch).ok()
}

/// `DD/MM/YYYY`, or `-` when the date is missing.
pub fn format_date(epoch: Option<i64>) -> String {
    let format = format_description!("[day]/[month]/[year]");
    epoch
        .filter(|e| *e != 0)
        .and_then(to_datetime)
        .and_then(|dt| dt.format(&format).ok())
        .unwrap_or_else(|| "-".to_owned())
}

/// `YYYY-MM-DD`, the value format of `<input type="date">`.
pub fn format_iso_date(epoch: i64) -> String {
    let format = format_description!("[year]-[month]-[day]");
    to_datetime(epoch)
        .and_then(|dt| dt.format(&format).ok())
        .unwrap_or_default()
}

/// Hour component of a `HH:MM[:SS]` clock string.
pub fn clock_hour(clock: &str) -> Option<u32> {
    let hour = clock.split(':').next()?.trim().parse::<u32>().ok()?;
    (hour < 24).then_some(hour)
}

fn clock_minutes(clock: &str) -> Option<i64> {
    let hour = i64::from(clock_hour(clock)?);
    let minute = clock.split(':').nth(1)?.trim().parse::<i64>().ok()?;
    (0..60).contains(&minute).then_some(hour * 60 + minute)
}

pub fn is_late(check_in: &str) -> bool {
    clock_hour(check_in).is_some_and(|h| h >= LATE_HOUR)
}

/// Worked duration between two clock times as `"{h}j {m}m"`. A check-out
/// earlier than the check-in is taken to be on the next day.
pub fn work_duration(check_in: &str, check_out: &str) -> Option<String> {
    let mut minutes = clock_minutes(check_out)? - clock_minutes(check_in)?;
    if minutes < 0 {
        minutes += 24 * 60;
    }
    Some(format!("{}j {}m", minutes / 60, minutes % 60))
}
