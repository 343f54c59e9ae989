//! Resource dispatch and multi-resource builds.
//!
//! Each configured source becomes one traversal with its own policy and
//! bucket registry. Sources write disjoint target paths, so `build_all`
//! runs them in parallel.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use barvault_core::{
    ArchiveError, ArtifactManifestEntry, CodeFilter, CodeRanges, ResourceKind, ResourcePolicy,
};
use chrono::NaiveDate;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{error, info};

use crate::compressor::{translate_folder, TraversalStats};
use crate::config::{ConfigError, RunConfig};

/// Errors that fail one resource build. Manifest entries of buckets that
/// were closed anyway stay in the report.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("source folder {} is not a directory", path.display())]
    SourceRoot { path: PathBuf },

    #[error("cannot create target folder {}: {source}", path.display())]
    TargetDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{count} file(s) failed to archive; first: {first}")]
    Output {
        count: usize,
        #[source]
        first: ArchiveError,
    },
}

/// `market.resource`, e.g. `sse.m5`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub market: String,
    pub kind: ResourceKind,
}

impl ResourceKey {
    pub fn new(market: &str, kind: ResourceKind) -> Self {
        Self {
            market: market.trim().to_ascii_lowercase(),
            kind,
        }
    }

    /// `<target_folder>/<MARKET>/<subpath>`, with `/` separators.
    pub fn target_prefix(&self, target_folder: &Path) -> String {
        let root = target_folder.to_string_lossy().replace('\\', "/");
        let root = root.trim_end_matches('/');
        format!(
            "{root}/{}/{}",
            self.market.to_ascii_uppercase(),
            self.kind.target_subpath()
        )
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.market, self.kind)
    }
}

impl FromStr for ResourceKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (market, resource) = s
            .split_once('.')
            .ok_or_else(|| format!("expected <market>.<resource>, got '{s}'"))?;
        if market.is_empty() || !market.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(format!("invalid market in '{s}'"));
        }
        let kind = resource.parse::<ResourceKind>()?;
        Ok(Self::new(market, kind))
    }
}

/// Outcome of one resource build.
#[derive(Debug)]
pub struct BuildReport {
    pub key: ResourceKey,
    pub source: PathBuf,
    pub entries: Vec<ArtifactManifestEntry>,
    pub stats: TraversalStats,
    pub error: Option<BuildError>,
}

impl BuildReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Archive one source folder as resource `key`.
///
/// The policy is released exactly once, whether or not the traversal
/// succeeded.
pub fn build_resource(
    key: &ResourceKey,
    source_root: &Path,
    target_folder: &Path,
    filter: Option<&dyn CodeFilter>,
    today: NaiveDate,
) -> BuildReport {
    let mut policy = ResourcePolicy::new(key.kind, key.to_string(), filter, today);
    let prefix = policy.rewrite_path(&key.target_prefix(target_folder));
    info!(resource = %key, source = %source_root.display(), prefix = %prefix, "building resource");

    let mut stats = TraversalStats::default();
    let error = match prepare(source_root, &prefix) {
        Err(err) => Some(err),
        Ok(()) => {
            let outcome = translate_folder(&mut policy, source_root, &prefix);
            stats = outcome.stats;
            let count = outcome.failures.len();
            outcome
                .failures
                .into_iter()
                .next()
                .map(|first| BuildError::Output { count, first })
        }
    };

    let entries = policy.release();
    match &error {
        Some(err) => error!(resource = %key, error = %err, archives = entries.len(), "build failed"),
        None => info!(
            resource = %key,
            archives = entries.len(),
            files = stats.files_archived,
            chunks = stats.chunks_written,
            "build finished"
        ),
    }

    BuildReport {
        key: key.clone(),
        source: source_root.to_path_buf(),
        entries,
        stats,
        error,
    }
}

fn prepare(source_root: &Path, prefix: &str) -> Result<(), BuildError> {
    if !source_root.is_dir() {
        return Err(BuildError::SourceRoot {
            path: source_root.to_path_buf(),
        });
    }
    if let Some(dir) = Path::new(prefix).parent() {
        std::fs::create_dir_all(dir).map_err(|source| BuildError::TargetDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Build every configured source in parallel. Reports keep config order.
pub fn build_all(config: &RunConfig, today: NaiveDate) -> Result<Vec<BuildReport>, ConfigError> {
    build_selected(config, today, &[])
}

/// Build the configured sources whose key is in `only` (all when empty).
///
/// The config is validated first, so no two jobs share a target prefix.
pub fn build_selected(
    config: &RunConfig,
    today: NaiveDate,
    only: &[ResourceKey],
) -> Result<Vec<BuildReport>, ConfigError> {
    config.validate()?;
    let mut jobs: Vec<(ResourceKey, &Path, Option<CodeRanges>)> = Vec::new();
    for source in &config.sources {
        let key = source.key()?;
        if !only.is_empty() && !only.contains(&key) {
            continue;
        }
        let filter = config.code_filter(&source.market)?;
        jobs.push((key, source.folder.as_path(), filter));
    }

    let reports = jobs
        .par_iter()
        .map(|(key, folder, filter)| {
            build_resource(
                key,
                folder,
                &config.target_folder,
                filter.as_ref().map(|r| r as &dyn CodeFilter),
                today,
            )
        })
        .collect();
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_parse_and_display() {
        let key: ResourceKey = "SSE.m60".parse().unwrap();
        assert_eq!(key.market, "sse");
        assert_eq!(key.kind, ResourceKind::Minute60);
        assert_eq!(key.to_string(), "sse.m60");
        assert!("sse".parse::<ResourceKey>().is_err());
        assert!("sse.m2".parse::<ResourceKey>().is_err());
        assert!("s e.d1".parse::<ResourceKey>().is_err());
    }

    #[test]
    fn target_prefix_layout() {
        let key = ResourceKey::new("szse", ResourceKind::Column(barvault_core::ColumnTable::Dy));
        assert_eq!(key.target_prefix(Path::new("/srv/sync/")), "/srv/sync/SZSE/COLUMN/DY.");
        let key = ResourceKey::new("sse", ResourceKind::RealtimeMinute1);
        assert_eq!(key.target_prefix(Path::new("out")), "out/SSE/REALMIN/REALMIN.");
    }

    #[test]
    fn missing_source_still_releases() {
        let out = tempfile::tempdir().unwrap();
        let key = ResourceKey::new("sse", ResourceKind::Day);
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let report = build_resource(&key, &out.path().join("nope"), out.path(), None, today);
        assert!(matches!(report.error, Some(BuildError::SourceRoot { .. })));
        assert!(report.entries.is_empty());
    }

    #[test]
    fn duplicate_sources_are_refused_before_building() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let line = "20240318,150000000,1,1,1,1,1,1,100,0,0,0\n";
        std::fs::write(src.path().join("DAY600000.csv"), line).unwrap();
        let source = |market: &str| crate::config::SourceConfig {
            market: market.to_string(),
            resource: "d1".to_string(),
            folder: src.path().to_path_buf(),
        };
        let config = RunConfig {
            target_folder: out.path().to_path_buf(),
            build_time: chrono::NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
            sources: vec![source("sse"), source("SSE")],
            code_ranges: Default::default(),
        };
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();

        let err = build_all(&config, today).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateSource(_)));
        assert!(!out.path().join("SSE").exists());
    }
}
