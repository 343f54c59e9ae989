//! Domain types for market-data records and resampled bars.

pub mod bar;
pub mod record;
pub mod time;

pub use bar::Bar;
pub use record::RawRecord;
pub use time::{TimeCode, TradeDate};
