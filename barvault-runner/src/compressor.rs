//! Folder traversal: walks a source tree and archives every qualifying file
//! through one resource policy.
//!
//! Directories are visited depth-first, subdirectories before the files
//! beside them, names in sorted order. Each file is read whole and sliced by
//! the policy loader; every chunk becomes one entry in its date bucket.

use barvault_core::{ArchiveError, EntryMeta, ResourcePolicy};
use std::fs;
use std::path::Path;
use tracing::{debug, error, warn};

/// Counters for one traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalStats {
    pub files_seen: usize,
    pub files_skipped: usize,
    pub files_archived: usize,
    pub chunks_written: usize,
    pub bytes_written: u64,
    /// Source files or directories that could not be read.
    pub source_errors: usize,
}

/// Result of one traversal: counters plus every output failure.
#[derive(Debug, Default)]
pub struct TraversalOutcome {
    pub stats: TraversalStats,
    /// Output failures, one per aborted file.
    pub failures: Vec<ArchiveError>,
}

/// Archive every qualifying file under `source_root` into buckets below
/// `target_prefix`.
///
/// Entry names are the source root's base name followed by the path under
/// it, passed through the policy's path rewrite. Source read errors are
/// logged and skipped; output errors abort the current file and are
/// collected. The caller releases the policy afterwards.
pub fn translate_folder(
    policy: &mut ResourcePolicy<'_>,
    source_root: &Path,
    target_prefix: &str,
) -> TraversalOutcome {
    let root_name = source_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut walker = Walker {
        policy,
        target_prefix,
        outcome: TraversalOutcome::default(),
    };
    walker.walk_dir(source_root, &root_name);
    walker.outcome
}

struct Walker<'p, 'f, 't> {
    policy: &'p mut ResourcePolicy<'f>,
    target_prefix: &'t str,
    outcome: TraversalOutcome,
}

impl Walker<'_, '_, '_> {
    fn source_error(&mut self, err: ArchiveError) {
        warn!(
            resource = self.policy.resource_type(),
            path = %err.path().display(),
            error = %err,
            "skipping unreadable source"
        );
        self.outcome.stats.source_errors += 1;
    }

    fn walk_dir(&mut self, dir: &Path, rel: &str) {
        let read = match fs::read_dir(dir) {
            Ok(read) => read,
            Err(source) => {
                return self.source_error(ArchiveError::SourceIo {
                    path: dir.to_path_buf(),
                    source,
                })
            }
        };

        let mut dirs = Vec::new();
        let mut files = Vec::new();
        for entry in read {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    self.source_error(ArchiveError::SourceIo {
                        path: dir.to_path_buf(),
                        source,
                    });
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                dirs.push(name);
            } else if file_type.is_file() {
                files.push(name);
            } else if file_type.is_symlink() && entry.path().is_file() {
                files.push(name);
            }
        }
        dirs.sort();
        files.sort();

        for name in dirs {
            self.walk_dir(&dir.join(&name), &join_rel(rel, &name));
        }
        for name in files {
            self.archive_file(&dir.join(&name), &join_rel(rel, &name));
        }
    }

    fn archive_file(&mut self, path: &Path, rel: &str) {
        self.outcome.stats.files_seen += 1;
        if !self.policy.qualifies(rel) {
            debug!(path = %path.display(), "file does not qualify");
            self.outcome.stats.files_skipped += 1;
            return;
        }

        let read = fs::read(path).and_then(|data| Ok((data, fs::metadata(path)?)));
        let (data, meta) = match read {
            Ok(pair) => pair,
            Err(source) => {
                return self.source_error(ArchiveError::SourceIo {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let meta = EntryMeta::from_metadata(&meta);
        let entry_name = self.policy.rewrite_path(rel);

        let mut offset = 0;
        while let Some(chunk) = self.policy.load_next(&data[offset..]) {
            offset += chunk.consumed;
            let written = self
                .policy
                .resolve_writer(self.target_prefix, chunk.date)
                .and_then(|bucket| bucket.append(&entry_name, &chunk.bytes, &meta));
            if let Err(err) = written {
                error!(
                    resource = self.policy.resource_type(),
                    source = %path.display(),
                    archive = %err.path().display(),
                    error = %err,
                    "aborting file"
                );
                self.outcome.failures.push(err);
                return;
            }
            self.outcome.stats.chunks_written += 1;
            self.outcome.stats.bytes_written += chunk.bytes.len() as u64;
        }
        debug!(path = %path.display(), entry = %entry_name, "archived");
        self.outcome.stats.files_archived += 1;
    }
}

fn join_rel(rel: &str, name: &str) -> String {
    if rel.is_empty() {
        name.to_string()
    } else {
        format!("{rel}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barvault_core::ResourceKind;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
    }

    #[test]
    fn join_rel_handles_empty_root() {
        assert_eq!(join_rel("", "a.csv"), "a.csv");
        assert_eq!(join_rel("DAY", "a.csv"), "DAY/a.csv");
    }

    #[test]
    fn counts_skipped_and_archived_files() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let root = src.path().join("DAY");
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("DAY600000.csv"), "20240318,1\n20240319,2\n").unwrap();
        fs::write(root.join("sub/DAY600001.csv"), "20240318,3\n").unwrap();
        fs::write(root.join("readme.txt"), "notes").unwrap();

        let mut policy = ResourcePolicy::new(ResourceKind::Day, "sse.d1", None, today());
        let prefix = format!("{}/DAY.", out.path().display());
        let outcome = translate_folder(&mut policy, &root, &prefix);

        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.stats.files_seen, 3);
        assert_eq!(outcome.stats.files_skipped, 1);
        assert_eq!(outcome.stats.files_archived, 2);
        assert_eq!(outcome.stats.chunks_written, 3);
        assert_eq!(policy.open_buckets(), 2);
        assert_eq!(policy.release().len(), 2);
    }

    #[test]
    fn missing_root_is_a_source_error() {
        let src = tempfile::tempdir().unwrap();
        let mut policy = ResourcePolicy::new(ResourceKind::Weight, "sse.wt", None, today());
        let outcome = translate_folder(&mut policy, &src.path().join("gone"), "/nowhere/WEIGHT.");
        assert_eq!(outcome.stats.source_errors, 1);
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn output_failure_aborts_file_and_is_collected() {
        let src = tempfile::tempdir().unwrap();
        let root = src.path().join("WEIGHT");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("w1.txt"), "600000,1.0\n").unwrap();

        let mut policy = ResourcePolicy::new(ResourceKind::Weight, "sse.wt", None, today());
        let prefix = format!("{}/missing/WEIGHT.", src.path().display());
        let outcome = translate_folder(&mut policy, &root, &prefix);

        assert_eq!(outcome.failures.len(), 1);
        assert!(matches!(outcome.failures[0], ArchiveError::OutputIo { .. }));
        assert_eq!(outcome.stats.files_archived, 0);
        assert!(policy.release().is_empty());
    }
}
