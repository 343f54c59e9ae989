//! Bar: a resampled K-line built by folding raw records.

use super::record::RawRecord;
use super::time::{TimeCode, TradeDate};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// An aggregated bar covering one time bucket of one trading date.
///
/// `time` is the bucket's nominal close time. Prices follow K-line rules:
/// open from the first record, high/low are extremes, close/settle/misc come
/// from the latest record, and the flow fields accumulate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: TradeDate,
    pub time: TimeCode,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub settle: f64,
    pub turnover: f64,
    pub volume: i64,
    pub open_interest: i64,
    pub trade_count: i64,
    pub misc: f64,
}

impl Bar {
    /// Start a new bar from the first record that falls in a bucket.
    pub fn seed(record: &RawRecord, close_time: TimeCode) -> Self {
        Self {
            date: record.date,
            time: close_time,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            settle: record.settle,
            turnover: record.turnover,
            volume: record.volume,
            open_interest: record.open_interest,
            trade_count: record.trade_count,
            misc: record.misc,
        }
    }

    /// Fold a later record of the same bucket into this bar.
    pub fn fold(&mut self, record: &RawRecord) {
        self.high = self.high.max(record.high);
        self.low = self.low.min(record.low);
        self.close = record.close;
        self.settle = record.settle;
        self.misc = record.misc;
        self.turnover += record.turnover;
        self.volume += record.volume;
        self.open_interest += record.open_interest;
        self.trade_count += record.trade_count;
    }

    /// View this bar as a record stamped at its close time.
    pub fn to_record(&self) -> RawRecord {
        RawRecord {
            date: self.date,
            time: self.time,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            settle: self.settle,
            turnover: self.turnover,
            volume: self.volume,
            open_interest: self.open_interest,
            trade_count: self.trade_count,
            misc: self.misc,
        }
    }

    /// Append the bar as one newline-terminated record line.
    ///
    /// The layout matches the source record format, so resampled output can
    /// be read back with [`RawRecord::parse_line`].
    pub fn write_line(&self, out: &mut String) {
        let _ = writeln!(
            out,
            "{},{},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{},{},{},{:.6}",
            self.date,
            self.time,
            self.open,
            self.high,
            self.low,
            self.close,
            self.settle,
            self.turnover,
            self.volume,
            self.open_interest,
            self.trade_count,
            self.misc,
        );
    }
}
