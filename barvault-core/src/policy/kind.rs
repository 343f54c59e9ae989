//! Resource kinds and their static properties.

use crate::resample::BarWidth;
use std::fmt;
use std::str::FromStr;

/// Sector/concept reference tables shipped as `.ini` files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnTable {
    Dy,
    Gn,
    Hy,
    Zs,
}

impl ColumnTable {
    /// Lowercase file-name fragment identifying the table.
    pub fn file_marker(self) -> &'static str {
        match self {
            Self::Dy => "dybk.ini",
            Self::Gn => "gnbk.ini",
            Self::Hy => "hybk.ini",
            Self::Zs => "zsbk.ini",
        }
    }
}

/// Which record dates a loader keeps, relative to the build date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Horizon {
    /// Every date.
    Unbounded,
    /// Dates at most this many calendar days before the build date.
    Days(i64),
    /// Only the build date itself.
    TodayOnly,
}

/// One kind of archived resource. Each kind has its own file predicate,
/// chunk loader, and target layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Day,
    Minute1,
    Minute5,
    Minute60,
    RealtimeMinute1,
    Weight,
    Column(ColumnTable),
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 10] = [
        Self::Day,
        Self::Minute1,
        Self::Minute5,
        Self::Minute60,
        Self::RealtimeMinute1,
        Self::Weight,
        Self::Column(ColumnTable::Dy),
        Self::Column(ColumnTable::Gn),
        Self::Column(ColumnTable::Hy),
        Self::Column(ColumnTable::Zs),
    ];

    /// Short lowercase key used in configs and manifests.
    pub fn key(self) -> &'static str {
        match self {
            Self::Day => "d1",
            Self::Minute1 => "m1",
            Self::Minute5 => "m5",
            Self::Minute60 => "m60",
            Self::RealtimeMinute1 => "rm1",
            Self::Weight => "wt",
            Self::Column(ColumnTable::Dy) => "dy",
            Self::Column(ColumnTable::Gn) => "gn",
            Self::Column(ColumnTable::Hy) => "hy",
            Self::Column(ColumnTable::Zs) => "zs",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    /// Folder and file prefix below the market directory, e.g. `MIN5/MIN5.`.
    pub fn target_subpath(self) -> &'static str {
        match self {
            Self::Day => "DAY/DAY.",
            Self::Minute1 => "MIN/MIN.",
            Self::Minute5 => "MIN5/MIN5.",
            Self::Minute60 => "MIN60/MIN60.",
            Self::RealtimeMinute1 => "REALMIN/REALMIN.",
            Self::Weight => "WEIGHT/WEIGHT.",
            Self::Column(ColumnTable::Dy) => "COLUMN/DY.",
            Self::Column(ColumnTable::Gn) => "COLUMN/GN.",
            Self::Column(ColumnTable::Hy) => "COLUMN/HY.",
            Self::Column(ColumnTable::Zs) => "COLUMN/ZS.",
        }
    }

    /// Output width for kinds that resample minute input.
    pub fn bar_width(self) -> Option<BarWidth> {
        match self {
            Self::Minute5 => Some(BarWidth::MINUTES_5),
            Self::Minute60 => Some(BarWidth::MINUTES_60),
            _ => None,
        }
    }

    /// Records outside the horizon are dropped while loading.
    pub fn horizon(self) -> Horizon {
        match self {
            Self::Minute1 => Horizon::Days(14),
            Self::Minute5 | Self::Minute60 => Horizon::Days(366),
            Self::RealtimeMinute1 => Horizon::TodayOnly,
            Self::Day | Self::Weight | Self::Column(_) => Horizon::Unbounded,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| format!("unknown resource '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_roundtrip() {
        for kind in ResourceKind::ALL {
            assert_eq!(ResourceKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!("M5".parse::<ResourceKind>(), Ok(ResourceKind::Minute5));
        assert!(ResourceKind::from_key("m15").is_none());
    }

    #[test]
    fn target_subpaths() {
        assert_eq!(ResourceKind::Minute60.target_subpath(), "MIN60/MIN60.");
        assert_eq!(
            ResourceKind::Column(ColumnTable::Hy).target_subpath(),
            "COLUMN/HY."
        );
    }

    #[test]
    fn only_resampling_kinds_have_width() {
        let widths: Vec<_> = ResourceKind::ALL
            .into_iter()
            .filter_map(ResourceKind::bar_width)
            .collect();
        assert_eq!(widths, vec![BarWidth::MINUTES_5, BarWidth::MINUTES_60]);
    }

    #[test]
    fn horizons() {
        assert_eq!(ResourceKind::Minute1.horizon(), Horizon::Days(14));
        assert_eq!(ResourceKind::Minute60.horizon(), Horizon::Days(366));
        assert_eq!(ResourceKind::RealtimeMinute1.horizon(), Horizon::TodayOnly);
        assert_eq!(ResourceKind::Weight.horizon(), Horizon::Unbounded);
    }
}
