//! Incremental K-line resampling.
//!
//! Buckets are right-closed intervals `(close - width, close]` in seconds of
//! day. A 1-minute bar stamped 09:31 lands in the 09:35 bucket, a bar stamped
//! exactly 09:35 also lands there, and a bar stamped 09:35:01 opens the 09:40
//! bucket. Because a resampled bar carries its close time, feeding resampled
//! output back through the same width reproduces it unchanged.

use crate::domain::{Bar, RawRecord, TimeCode};

/// Output bar width in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BarWidth(u32);

impl BarWidth {
    pub const MINUTES_5: BarWidth = BarWidth(5);
    pub const MINUTES_60: BarWidth = BarWidth(60);

    /// Returns `None` for a zero width.
    pub fn minutes(minutes: u32) -> Option<Self> {
        (minutes > 0).then_some(Self(minutes))
    }

    pub fn as_minutes(self) -> u32 {
        self.0
    }

    fn seconds(self) -> u32 {
        self.0 * 60
    }

    /// Nominal close time of the bucket containing `time`.
    pub fn bucket_close(self, time: TimeCode) -> TimeCode {
        let width = self.seconds();
        let close = time.seconds_of_day().div_ceil(width) * width;
        TimeCode::from_seconds_of_day(close)
    }
}

/// Streaming aggregator for one trading date.
///
/// Push records in ascending time order; each push returns the bar that was
/// completed by it, if any. `finish` flushes the last bar in progress.
#[derive(Debug)]
pub struct Resampler {
    width: BarWidth,
    current: Option<Bar>,
}

impl Resampler {
    pub fn new(width: BarWidth) -> Self {
        Self {
            width,
            current: None,
        }
    }

    pub fn push(&mut self, record: &RawRecord) -> Option<Bar> {
        let close = self.width.bucket_close(record.time);
        let bucket_start = i64::from(close.seconds_of_day()) - i64::from(self.width.seconds());

        match self.current.as_mut() {
            Some(bar) if i64::from(bar.time.seconds_of_day()) > bucket_start => {
                bar.fold(record);
                None
            }
            // Unset, or time crossed into a new bucket.
            _ => self.current.replace(Bar::seed(record, close)),
        }
    }

    pub fn finish(self) -> Option<Bar> {
        self.current
    }
}

/// Resample a whole slice of same-date records.
pub fn resample<'a>(records: impl IntoIterator<Item = &'a RawRecord>, width: BarWidth) -> Vec<Bar> {
    let mut resampler = Resampler::new(width);
    let mut bars: Vec<Bar> = records
        .into_iter()
        .filter_map(|rec| resampler.push(rec))
        .collect();
    bars.extend(resampler.finish());
    bars
}
