//! Resource policies: which files qualify, how they are chunked, and where
//! the chunks are archived.
//!
//! A [`ResourcePolicy`] is created for exactly one traversal. It owns the
//! bucket registry of that traversal and is consumed by [`ResourcePolicy::release`].

mod kind;

pub use kind::{ColumnTable, Horizon, ResourceKind};

use crate::archive::{ArchiveBucket, BucketRegistry, CompressionLevel};
use crate::bucket::BucketRule;
use crate::chunk::{next_date_run, Chunk};
use crate::domain::{RawRecord, TradeDate};
use crate::error::ArchiveError;
use crate::filter::{base_name, day_code, minute_code_and_year, CodeFilter};
use crate::manifest::ArtifactManifestEntry;
use crate::resample::{resample, BarWidth};
use chrono::{Datelike, NaiveDate};
use std::fmt;

pub struct ResourcePolicy<'f> {
    kind: ResourceKind,
    resource_type: String,
    filter: Option<&'f dyn CodeFilter>,
    today: NaiveDate,
    registry: BucketRegistry,
}

impl<'f> ResourcePolicy<'f> {
    /// `resource_type` labels manifest entries (e.g. `sse.m5`). Without a
    /// filter every instrument code is accepted.
    pub fn new(
        kind: ResourceKind,
        resource_type: impl Into<String>,
        filter: Option<&'f dyn CodeFilter>,
        today: NaiveDate,
    ) -> Self {
        Self {
            kind,
            resource_type: resource_type.into(),
            filter,
            today,
            registry: BucketRegistry::new(compression_level_of(kind)),
        }
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    fn code_accepted(&self, code: &str) -> bool {
        self.filter.map_or(true, |f| f.in_range(code))
    }

    /// Case-insensitive test of a file's base name.
    pub fn qualifies(&self, file_name: &str) -> bool {
        let name = base_name(file_name).to_ascii_lowercase();
        match self.kind {
            ResourceKind::Day => day_code(&name).is_some_and(|code| self.code_accepted(&code)),
            ResourceKind::Minute1
            | ResourceKind::Minute5
            | ResourceKind::Minute60
            | ResourceKind::RealtimeMinute1 => {
                let Some((code, year)) = minute_code_and_year(&name) else {
                    return false;
                };
                self.year_accepted(year) && self.code_accepted(&code)
            }
            ResourceKind::Weight => true,
            ResourceKind::Column(table) => name.contains(table.file_marker()),
        }
    }

    fn year_accepted(&self, year: i32) -> bool {
        let current = self.today.year();
        match self.kind {
            ResourceKind::Minute5 | ResourceKind::Minute60 => year == current || year == current - 1,
            _ => year == current,
        }
    }

    /// Rewrite a target prefix or entry name into this resource's layout.
    pub fn rewrite_path(&self, path: &str) -> String {
        match self.kind {
            ResourceKind::Minute5 => path.replace("MIN/", "MIN5/"),
            ResourceKind::Minute60 => path.replace("MIN/", "MIN60/"),
            _ => path.to_string(),
        }
    }

    fn keeps_date(&self, date: TradeDate) -> bool {
        match self.kind.horizon() {
            Horizon::Unbounded => true,
            Horizon::Days(days) => date.days_before(self.today) <= days,
            Horizon::TodayOnly => date.to_naive() == self.today,
        }
    }

    /// Slice the next date-homogeneous chunk from the front of `buf`.
    ///
    /// Callers advance by `consumed` and call again until `None`.
    pub fn load_next(&self, buf: &[u8]) -> Option<Chunk> {
        match self.kind {
            ResourceKind::Weight | ResourceKind::Column(_) => whole_buffer(buf),
            kind => match kind.bar_width() {
                Some(width) => self.load_resampled(buf, width),
                None => {
                    let run = next_date_run(buf, |date| self.keeps_date(date))?;
                    Some(Chunk {
                        bytes: run.passthrough_bytes(),
                        date: run.date,
                        consumed: run.consumed,
                    })
                }
            },
        }
    }

    fn load_resampled(&self, buf: &[u8], width: BarWidth) -> Option<Chunk> {
        let mut offset = 0;
        loop {
            let run = next_date_run(&buf[offset..], |date| self.keeps_date(date))?;
            offset += run.consumed;

            let mut records: Vec<RawRecord> = run
                .lines
                .iter()
                .filter_map(|line| std::str::from_utf8(line).ok())
                .filter_map(RawRecord::parse_line)
                .collect();
            // A run whose lines all fail to parse produces no bars; keep scanning.
            if records.is_empty() {
                continue;
            }
            records.sort_by_key(|r| r.time);

            let mut out = String::new();
            for bar in resample(&records, width) {
                bar.write_line(&mut out);
            }
            return Some(Chunk {
                bytes: out.into_bytes(),
                date: run.date,
                consumed: offset,
            });
        }
    }

    pub fn compression_level(&self) -> CompressionLevel {
        compression_level_of(self.kind)
    }

    pub fn bucket_rule(&self) -> BucketRule {
        match self.kind {
            ResourceKind::Day => BucketRule::monthly(),
            _ => BucketRule::half_month(),
        }
    }

    pub fn bucket_key(&self, prefix: &str, date: TradeDate) -> String {
        self.bucket_rule().bucket_key(prefix, date, self.today)
    }

    /// Writer for the bucket holding `date` under `prefix`, opened on first use.
    pub fn resolve_writer(
        &mut self,
        prefix: &str,
        date: TradeDate,
    ) -> Result<&mut ArchiveBucket, ArchiveError> {
        let key = self.bucket_key(prefix, date);
        self.registry.resolve(key)
    }

    pub fn open_buckets(&self) -> usize {
        self.registry.len()
    }

    /// Close every bucket and return the manifest of this traversal.
    pub fn release(self) -> Vec<ArtifactManifestEntry> {
        self.registry.release(&self.resource_type)
    }
}

impl fmt::Debug for ResourcePolicy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourcePolicy")
            .field("kind", &self.kind)
            .field("resource_type", &self.resource_type)
            .field("filtered", &self.filter.is_some())
            .field("today", &self.today)
            .field("registry", &self.registry)
            .finish()
    }
}

fn compression_level_of(kind: ResourceKind) -> CompressionLevel {
    match kind {
        ResourceKind::Day => CompressionLevel::Fastest,
        _ => CompressionLevel::Balanced,
    }
}

fn whole_buffer(buf: &[u8]) -> Option<Chunk> {
    if buf.is_empty() {
        return None;
    }
    Some(Chunk {
        bytes: buf.to_vec(),
        date: TradeDate::REFERENCE,
        consumed: buf.len(),
    })
}
