//! Epoch timestamps to canonical local-time strings.
//!
//! The provider's `timezone_offset` is added to the epoch value *before*
//! formatting in the local zone; no zone conversion happens beyond that.

use std::fmt::Display;

use chrono::{Local, NaiveDate, NaiveTime, TimeZone};

use crate::error::ReportError;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format `ts + tz_offset` in the process's local time zone.
pub fn localize(ts: i64, tz_offset: i64) -> Result<String, ReportError> {
    localize_in(&Local, ts, tz_offset)
}

/// Format `ts + tz_offset` in `tz`.
pub fn localize_in<Tz>(tz: &Tz, ts: i64, tz_offset: i64) -> Result<String, ReportError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let shifted = ts.checked_add(tz_offset).ok_or(ReportError::InvalidTimestamp(ts))?;
    let local = tz
        .timestamp_opt(shifted, 0)
        .single()
        .ok_or(ReportError::InvalidTimestamp(shifted))?;

    Ok(local.format(TIMESTAMP_FORMAT).to_string())
}

/// Canonical string for `hour:00:00` on `day`, as it appears in localized records.
pub fn hour_stamp(day: NaiveDate, hour: u32) -> Result<String, ReportError> {
    let time = NaiveTime::from_hms_opt(hour, 0, 0)
        .ok_or_else(|| ReportError::malformed(format!("{hour} is not an hour of the day")))?;

    Ok(day.and_time(time).format(TIMESTAMP_FORMAT).to_string())
}

/// Epoch seconds of local midnight starting `day` in `tz`.
///
/// On a day whose midnight is skipped or repeated the earliest valid instant wins.
pub fn local_midnight<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> Result<i64, ReportError> {
    let midnight = day.and_time(NaiveTime::MIN);

    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            // Midnight fell into a DST gap; the day starts at the first valid hour.
            (1..=3).find_map(|h| {
                tz.from_local_datetime(&(midnight + chrono::Duration::hours(h))).earliest()
            })
        })
        .map(|dt| dt.timestamp())
        .ok_or_else(|| ReportError::malformed(format!("{day} has no local midnight")))
}
