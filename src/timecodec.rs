//! Timestamp conversion for the epoch formats browsers store on disk
//!
//! - Chromium/WebKit: microseconds since 1601-01-01 00:00:00
//! - Firefox PRTime: microseconds since 1970-01-01 00:00:00
//! - Firefox cookie expiry: seconds since the Unix epoch
//! - Firefox logins.json: milliseconds since the Unix epoch
//!
//! History-style decoders drop anything outside [`MIN_YEAR`, `MAX_YEAR`] as corrupt.
//! The Unix seconds/milliseconds decoders only drop null and zero.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};

pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2030;

/// Display format shared by every decoded timestamp
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Convert a Chromium timestamp without the plausibility window
pub fn chrome_to_datetime(chrome_time: i64) -> Option<NaiveDateTime> {
    if chrome_time <= 0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1601, 1, 1)?.and_hms_opt(0, 0, 0)?;
    epoch.checked_add_signed(Duration::microseconds(chrome_time))
}

/// Convert a Firefox PRTime timestamp without the plausibility window
pub fn firefox_to_datetime(firefox_time: i64) -> Option<NaiveDateTime> {
    if firefox_time <= 0 {
        return None;
    }
    from_unix(
        firefox_time.div_euclid(1_000_000),
        firefox_time.rem_euclid(1_000_000) * 1_000,
    )
}

pub fn decode_chrome(chrome_time: Option<i64>) -> Option<NaiveDateTime> {
    chrome_time.and_then(chrome_to_datetime).filter(in_year_window)
}

pub fn decode_firefox(firefox_time: Option<i64>) -> Option<NaiveDateTime> {
    firefox_time.and_then(firefox_to_datetime).filter(in_year_window)
}

/// Firefox cookie `expiry` column
pub fn decode_unix_seconds(seconds: Option<i64>) -> Option<NaiveDateTime> {
    seconds.filter(|s| *s != 0).and_then(|s| from_unix(s, 0))
}

/// Firefox `logins.json` `timeCreated` field
pub fn decode_unix_millis(millis: Option<i64>) -> Option<NaiveDateTime> {
    millis
        .filter(|m| *m != 0)
        .and_then(|m| from_unix(m.div_euclid(1_000), m.rem_euclid(1_000) * 1_000_000))
}

pub fn format_timestamp(datetime: &NaiveDateTime) -> String {
    datetime.format(TIMESTAMP_FORMAT).to_string()
}

fn from_unix(secs: i64, nanos: i64) -> Option<NaiveDateTime> {
    let nanos = u32::try_from(nanos).ok()?;
    DateTime::from_timestamp(secs, nanos).map(|dt| dt.naive_utc())
}

fn in_year_window(datetime: &NaiveDateTime) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&datetime.year())
}
