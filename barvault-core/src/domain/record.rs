//! RawRecord: one parsed line of a minute/tick price file.

use super::time::{TimeCode, TradeDate};
use serde::{Deserialize, Serialize};

/// One price/volume record as it appears in a source file.
///
/// Field order on disk: date, time, open, high, low, close, settle,
/// turnover, volume, open interest, trade count, misc indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
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

impl RawRecord {
    /// Parse one line. Returns `None` when the line is short or any field
    /// fails numeric parsing; callers skip such lines.
    ///
    /// Fields beyond the twelfth are ignored.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut fields = line.trim_end_matches(['\r', '\n']).split(',');
        let mut next = || fields.next().map(str::trim);

        Some(Self {
            date: TradeDate::parse(next()?)?,
            time: TimeCode::parse(next()?)?,
            open: next()?.parse().ok()?,
            high: next()?.parse().ok()?,
            low: next()?.parse().ok()?,
            close: next()?.parse().ok()?,
            settle: next()?.parse().ok()?,
            turnover: next()?.parse().ok()?,
            volume: next()?.parse().ok()?,
            open_interest: next()?.parse().ok()?,
            trade_count: next()?.parse().ok()?,
            misc: next()?.parse().ok()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = "20240102,93100000,10.5,10.8,10.4,10.7,10.6,123456.5,1200,300,45,0.25";

    #[test]
    fn parses_full_line() {
        let rec = RawRecord::parse_line(LINE).unwrap();
        assert_eq!(rec.date.as_u32(), 20240102);
        assert_eq!(rec.time.as_u32(), 93100000);
        assert_eq!(rec.open, 10.5);
        assert_eq!(rec.high, 10.8);
        assert_eq!(rec.low, 10.4);
        assert_eq!(rec.close, 10.7);
        assert_eq!(rec.settle, 10.6);
        assert_eq!(rec.turnover, 123456.5);
        assert_eq!(rec.volume, 1200);
        assert_eq!(rec.open_interest, 300);
        assert_eq!(rec.trade_count, 45);
        assert_eq!(rec.misc, 0.25);
    }

    #[test]
    fn tolerates_crlf_and_padding() {
        let line = format!("{LINE}\r\n").replace(',', " , ");
        assert!(RawRecord::parse_line(&line).is_some());
    }

    #[test]
    fn rejects_short_line() {
        assert!(RawRecord::parse_line("20240102,93100000,10.5").is_none());
    }

    #[test]
    fn rejects_non_numeric_field() {
        let line = LINE.replace("1200", "n/a");
        assert!(RawRecord::parse_line(&line).is_none());
    }

    #[test]
    fn ignores_extra_trailing_fields() {
        let line = format!("{LINE},extra");
        assert!(RawRecord::parse_line(&line).is_some());
    }
}
