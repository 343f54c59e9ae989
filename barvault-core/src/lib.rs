//! Barvault Core: record parsing, K-line resampling, resource policies, and
//! date-bucketed archive writers.
//!
//! This crate contains the archive engine:
//! - Domain types (trade dates, time codes, raw records, bars)
//! - Incremental resampling of minute records into 5/60-minute bars
//! - Date-homogeneous chunking of whole-file buffers
//! - One policy per resource kind (file predicate, loader, path rewrite)
//! - Bucket registry mapping (prefix, date) to one gzip'd tar per bucket
//! - Manifest entries with BLAKE3 content hashes

pub mod archive;
pub mod bucket;
pub mod chunk;
pub mod domain;
pub mod error;
pub mod filter;
pub mod manifest;
pub mod policy;
pub mod resample;

pub use archive::{ArchiveBucket, BucketRegistry, CompressionLevel, EntryMeta};
pub use bucket::{BucketRule, Collapse, RECENT_WINDOW_DAYS};
pub use chunk::Chunk;
pub use domain::{Bar, RawRecord, TimeCode, TradeDate};
pub use error::ArchiveError;
pub use filter::{CodeFilter, CodeRanges, RangeParseError};
pub use manifest::{hash_file, ArtifactManifestEntry};
pub use policy::{ColumnTable, Horizon, ResourceKind, ResourcePolicy};
pub use resample::{resample, BarWidth, Resampler};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything a parallel build moves across threads
    /// is Send, and shared configuration is Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<RawRecord>();
        require_sync::<RawRecord>();
        require_send::<Bar>();
        require_sync::<Bar>();
        require_send::<Chunk>();
        require_send::<ArtifactManifestEntry>();
        require_sync::<ArtifactManifestEntry>();
        require_send::<CodeRanges>();
        require_sync::<CodeRanges>();

        require_send::<BucketRegistry>();
        require_send::<ResourcePolicy<'static>>();
        require_send::<ArchiveError>();
        require_sync::<ArchiveError>();
    }

    /// A policy only borrows its filter, so one set of ranges can serve many
    /// policies at once.
    #[test]
    fn policies_share_one_filter() {
        let ranges = CodeRanges::parse(["600000-609999"]).unwrap();
        let today = chrono::NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let day = ResourcePolicy::new(ResourceKind::Day, "sse.d1", Some(&ranges), today);
        let m1 = ResourcePolicy::new(ResourceKind::Minute1, "sse.m1", Some(&ranges), today);
        assert!(day.qualifies("DAY600001.csv"));
        assert!(m1.qualifies("MIN600001_2024.csv"));
        assert!(!m1.qualifies("MIN000001_2024.csv"));
    }
}
