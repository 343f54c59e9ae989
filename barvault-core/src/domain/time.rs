//! Trading dates and intraday time codes.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A trading date encoded as a `YYYYMMDD` integer.
///
/// Construction always validates the calendar date, so every `TradeDate`
/// converts to a `NaiveDate` without failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TradeDate(u32);

impl TradeDate {
    /// Fixed date stamped on reference tables (weights, column tables) that
    /// carry no date of their own.
    pub const REFERENCE: TradeDate = TradeDate(20120609);

    /// Build from a `YYYYMMDD` integer. Returns `None` for impossible dates.
    pub fn new(yyyymmdd: u32) -> Option<Self> {
        let year = (yyyymmdd / 10_000) as i32;
        let month = yyyymmdd / 100 % 100;
        let day = yyyymmdd % 100;
        NaiveDate::from_ymd_opt(year, month, day).map(|_| Self(yyyymmdd))
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date.year() as u32 * 10_000 + date.month() * 100 + date.day())
    }

    /// Parse the leading field of a record line.
    pub fn parse(field: &str) -> Option<Self> {
        let field = field.trim().trim_start_matches('\u{feff}');
        if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        field.parse::<u32>().ok().and_then(Self::new)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn year(self) -> i32 {
        (self.0 / 10_000) as i32
    }

    pub fn month(self) -> u32 {
        self.0 / 100 % 100
    }

    pub fn day(self) -> u32 {
        self.0 % 100
    }

    pub fn to_naive(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year(), self.month(), self.day())
            .unwrap_or(NaiveDate::MIN)
    }

    /// Whole calendar days between this date and `today` (negative for future dates).
    pub fn days_before(self, today: NaiveDate) -> i64 {
        (today - self.to_naive()).num_days()
    }

    /// Same year and month, different day. Only used with days 1 and 16,
    /// which exist in every month.
    pub(crate) fn with_day(self, day: u32) -> Self {
        Self(self.0 / 100 * 100 + day)
    }
}

impl TryFrom<u32> for TradeDate {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("invalid trade date {value}"))
    }
}

impl From<TradeDate> for u32 {
    fn from(value: TradeDate) -> Self {
        value.0
    }
}

impl fmt::Display for TradeDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Intraday time code in `HHMMSSmmm` form (e.g. `93500000` is 09:35:00.000).
///
/// `240000000` is accepted so that the last bucket of a day can close at
/// midnight; any other time in hour 24 is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeCode(u32);

impl TimeCode {
    pub fn new(hhmmssmmm: u32) -> Option<Self> {
        let hours = hhmmssmmm / 10_000_000;
        let minutes = hhmmssmmm / 100_000 % 100;
        let seconds = hhmmssmmm / 1_000 % 100;
        if hours > 24 || minutes >= 60 || seconds >= 60 {
            return None;
        }
        if hours == 24 && hhmmssmmm % 10_000_000 != 0 {
            return None;
        }
        Some(Self(hhmmssmmm))
    }

    pub fn parse(field: &str) -> Option<Self> {
        field.trim().parse::<u32>().ok().and_then(Self::new)
    }

    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self(hours * 10_000_000 + minutes * 100_000 + seconds * 1_000)
    }

    /// Milliseconds are dropped.
    pub fn from_seconds_of_day(seconds: u32) -> Self {
        Self::from_hms(seconds / 3600, seconds / 60 % 60, seconds % 60)
    }

    pub fn seconds_of_day(self) -> u32 {
        let hours = self.0 / 10_000_000;
        let minutes = self.0 / 100_000 % 100;
        let seconds = self.0 / 1_000 % 100;
        hours * 3600 + minutes * 60 + seconds
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
