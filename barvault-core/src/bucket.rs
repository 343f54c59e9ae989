//! Date → bucket routing.
//!
//! Recent dates get one container per day so that re-archiving today's data
//! never touches older containers. Older dates collapse into half-month (or,
//! for daily bars, whole-month) containers.

use crate::domain::TradeDate;
use chrono::NaiveDate;

/// Dates at most this many calendar days before today keep a per-day bucket.
pub const RECENT_WINDOW_DAYS: i64 = 16;

/// Granularity of buckets for dates outside the recent window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collapse {
    /// Days 1–15 → the 1st, days 16+ → the 16th.
    HalfMonth,
    /// Every day → the 1st.
    Month,
}

/// Maps a record date to the suffix of its bucket file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketRule {
    pub recent_days: i64,
    pub collapse: Collapse,
}

impl BucketRule {
    pub fn half_month() -> Self {
        Self {
            recent_days: RECENT_WINDOW_DAYS,
            collapse: Collapse::HalfMonth,
        }
    }

    pub fn monthly() -> Self {
        Self {
            recent_days: RECENT_WINDOW_DAYS,
            collapse: Collapse::Month,
        }
    }

    pub fn is_recent(&self, date: TradeDate, today: NaiveDate) -> bool {
        date.days_before(today) <= self.recent_days
    }

    /// Date that names the bucket holding `date`.
    pub fn suffix(&self, date: TradeDate, today: NaiveDate) -> TradeDate {
        if self.is_recent(date, today) {
            return date;
        }
        match self.collapse {
            Collapse::HalfMonth if date.day() >= 16 => date.with_day(16),
            Collapse::HalfMonth | Collapse::Month => date.with_day(1),
        }
    }

    /// Full bucket key: `prefix` followed by the suffix date.
    pub fn bucket_key(&self, prefix: &str, date: TradeDate, today: NaiveDate) -> String {
        format!("{prefix}{}", self.suffix(date, today))
    }
}
