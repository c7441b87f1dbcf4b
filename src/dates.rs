//! Civil-date helpers for puzzle keys.
//!
//! Puzzles are keyed by the calendar date in America/New_York and go live at
//! local midnight there. Wall-clock access goes through [`Clock`] so callers
//! can pin "now" in tests.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::America::New_York;

pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Today's puzzle key: the current New York civil date as `YYYY-MM-DD`.
pub fn today_key<C: Clock + ?Sized>(clock: &C) -> String {
    format_date_key(eastern_date(clock.now()))
}

#[must_use]
pub fn format_date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Parses a strict `YYYY-MM-DD` key naming a real calendar date.
///
/// chrono's parser tolerates unpadded fields, so the shape is checked first.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    let bytes = key.as_bytes();
    if bytes.len() != 10 {
        return None;
    }
    let shape_ok = bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(key, DATE_KEY_FORMAT).ok()
}

#[must_use]
pub fn eastern_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&New_York).date_naive()
}

/// Whether `instant` falls exactly on 00:00:00 New York time of `date`.
///
/// Sub-second precision is ignored.
#[must_use]
pub fn is_eastern_midnight(instant: DateTime<Utc>, date: NaiveDate) -> bool {
    let local = instant.with_timezone(&New_York);
    local.date_naive() == date && local.hour() == 0 && local.minute() == 0 && local.second() == 0
}

/// The UTC instant of local midnight in New York on `date`.
pub fn eastern_midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    match New_York.from_local_datetime(&date.and_time(NaiveTime::default())) {
        LocalResult::Single(t) => Some(t.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}
