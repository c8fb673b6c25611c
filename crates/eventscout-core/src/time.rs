//! Date handling for event records.
//!
//! Providers hand over dates as loosely formatted strings. This module
//! provides [`EventDate`] for the parsed form (a specific datetime or a
//! date-only value), [`parse_event_date`] to read the formats seen in the
//! wild, and [`SyntheticSchedule`] for records that arrive without dates.

use std::cmp::Ordering;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Days between consecutive synthetic start dates.
pub const SYNTHETIC_SPACING_DAYS: i64 = 7;

/// Length of a synthetic event, in days.
pub const SYNTHETIC_LENGTH_DAYS: i64 = 2;

/// Naive datetime layouts accepted after RFC 3339 fails.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// A parsed event date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum EventDate {
    /// A specific point in time, stored in UTC.
    DateTime(DateTime<Utc>),
    /// A calendar day without a time of day.
    Date(NaiveDate),
}

impl EventDate {
    /// Converts to a UTC datetime for comparison purposes.
    ///
    /// Date-only values compare at midnight UTC.
    pub fn to_utc_datetime(&self) -> DateTime<Utc> {
        match self {
            Self::DateTime(dt) => *dt,
            Self::Date(date) => date.and_time(chrono::NaiveTime::MIN).and_utc(),
        }
    }

    /// Returns the calendar day.
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::DateTime(dt) => dt.date_naive(),
            Self::Date(date) => *date,
        }
    }

    /// Returns true if this is a date-only value.
    pub fn is_date_only(&self) -> bool {
        matches!(self, Self::Date(_))
    }
}

impl PartialOrd for EventDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventDate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_utc_datetime().cmp(&other.to_utc_datetime())
    }
}

/// Parses a provider date string.
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DD[THH:MM[:SS]]` values
/// (read as UTC) and bare `YYYY-MM-DD` dates. Returns `None` for anything
/// else; callers treat that as an invalid date rather than an error.
pub fn parse_event_date(input: &str) -> Option<EventDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(EventDate::DateTime(dt.with_timezone(&Utc)));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(EventDate::DateTime(naive.and_utc()));
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .map(EventDate::Date)
}

/// Formats a timestamp the way canonical events carry it
/// (`2030-01-01T09:00:00.000Z`).
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Formats a calendar day as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Resolves a month/day string such as `"Dec 7"`, `"December 7"` or
/// `"Dec 7, 2031"` to a date.
///
/// Without an explicit year the next occurrence on or after `today` is used.
pub fn resolve_month_day(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let cleaned = input.trim().trim_end_matches(',').replace(',', "");
    if cleaned.is_empty() {
        return None;
    }

    for format in ["%b %d %Y", "%B %d %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, format) {
            return Some(date);
        }
    }

    for year in [today.year(), today.year() + 1] {
        let with_year = format!("{} {}", cleaned, year);
        for format in ["%b %d %Y", "%B %d %Y"] {
            if let Ok(date) = NaiveDate::parse_from_str(&with_year, format)
                && date >= today
            {
                return Some(date);
            }
        }
    }

    None
}

/// Placeholder dates for a record that arrived without any.
///
/// The start is `now + (index + 1) × 7 days` and the end two days later, so
/// every event stays sortable and lands in the future.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticSchedule {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SyntheticSchedule {
    /// Computes the schedule for the record at `index` in its result list.
    pub fn for_index(index: usize, now: DateTime<Utc>) -> Self {
        let start = now + Duration::days(SYNTHETIC_SPACING_DAYS * (index as i64 + 1));
        let end = start + Duration::days(SYNTHETIC_LENGTH_DAYS);
        Self { start, end }
    }

    /// Returns the formatted start timestamp.
    pub fn start_string(&self) -> String {
        format_timestamp(self.start)
    }

    /// Returns the formatted end timestamp.
    pub fn end_string(&self) -> String {
        format_timestamp(self.end)
    }
}
