//! Date-bucketed archive writers.
//!
//! Each bucket is one `.tar` stream wrapped in gzip, written strictly
//! sequentially: an entry's header and body are appended together, and a
//! bucket is finished exactly once when its registry is released.
//!
//! Layout of a bucket key: `{target_prefix}{YYYYMMDD}`, e.g.
//! `/srv/sync/SSE/MIN5/MIN5.20240316`.

use crate::error::ArchiveError;
use crate::manifest::{hash_file, ArtifactManifestEntry};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{info, warn};

/// Gzip effort for a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// Lowest effort, for archives rewritten on every run.
    Fastest,
    #[default]
    Balanced,
}

impl CompressionLevel {
    fn to_flate2(self) -> Compression {
        match self {
            Self::Fastest => Compression::fast(),
            Self::Balanced => Compression::default(),
        }
    }
}

/// Provenance metadata copied from the source file onto each entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMeta {
    pub mode: u32,
    /// Seconds since the Unix epoch.
    pub mtime: u64,
}

impl EntryMeta {
    pub fn from_metadata(meta: &fs::Metadata) -> Self {
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |d| d.as_secs());
        Self {
            mode: file_mode(meta),
            mtime,
        }
    }
}

#[cfg(unix)]
fn file_mode(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn file_mode(meta: &fs::Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

/// One open output container.
pub struct ArchiveBucket {
    path: PathBuf,
    builder: tar::Builder<GzEncoder<File>>,
    entries: usize,
}

impl ArchiveBucket {
    /// Create (or truncate) the container file and open its streams.
    pub fn create(path: &Path, level: CompressionLevel) -> Result<Self, ArchiveError> {
        let file = File::create(path).map_err(|source| ArchiveError::OutputIo {
            path: path.to_path_buf(),
            source,
        })?;
        let encoder = GzEncoder::new(file, level.to_flate2());
        Ok(Self {
            path: path.to_path_buf(),
            builder: tar::Builder::new(encoder),
            entries: 0,
        })
    }

    pub fn entry_count(&self) -> usize {
        self.entries
    }

    /// Append one entry: header from `meta` and `data.len()`, body `data`.
    pub fn append(&mut self, name: &str, data: &[u8], meta: &EntryMeta) -> Result<(), ArchiveError> {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(data.len() as u64);
        header.set_mode(meta.mode);
        header.set_mtime(meta.mtime);

        self.builder
            .append_data(&mut header, name, data)
            .map_err(|source| ArchiveError::OutputIo {
                path: self.path.clone(),
                source,
            })?;
        self.entries += 1;
        Ok(())
    }

    /// Write the tar trailer, finish the gzip stream, and sync to disk.
    pub fn finish(self) -> Result<PathBuf, ArchiveError> {
        let path = self.path;
        let output_err = |source| ArchiveError::OutputIo {
            path: path.clone(),
            source,
        };

        let encoder = self.builder.into_inner().map_err(output_err)?;
        let file = encoder.finish().map_err(output_err)?;
        file.sync_all().map_err(output_err)?;
        Ok(path)
    }
}

impl std::fmt::Debug for ArchiveBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveBucket")
            .field("path", &self.path)
            .field("entries", &self.entries)
            .finish()
    }
}

/// Open buckets of one traversal, keyed by bucket path.
///
/// Ordered by key so that release order is independent of traversal order.
#[derive(Debug)]
pub struct BucketRegistry {
    level: CompressionLevel,
    buckets: BTreeMap<String, ArchiveBucket>,
}

impl BucketRegistry {
    pub fn new(level: CompressionLevel) -> Self {
        Self {
            level,
            buckets: BTreeMap::new(),
        }
    }

    /// Cached writer for `key`, opening the container on first use.
    pub fn resolve(&mut self, key: String) -> Result<&mut ArchiveBucket, ArchiveError> {
        match self.buckets.entry(key) {
            Entry::Occupied(slot) => Ok(slot.into_mut()),
            Entry::Vacant(slot) => {
                let bucket = ArchiveBucket::create(Path::new(slot.key()), self.level)?;
                info!(path = %slot.key(), level = ?self.level, "opened archive bucket");
                Ok(slot.insert(bucket))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Close every bucket in ascending key order, then hash each closed file.
    ///
    /// A bucket that fails to close or hash is logged and left out of the
    /// manifest; the remaining entries are still returned.
    pub fn release(self, resource_type: &str) -> Vec<ArtifactManifestEntry> {
        info!(
            resource = resource_type,
            count = self.buckets.len(),
            "flushing archive buckets"
        );

        let closed: Vec<PathBuf> = self
            .buckets
            .into_values()
            .filter_map(|bucket| match bucket.finish() {
                Ok(path) => Some(path),
                Err(err) => {
                    warn!(error = %err, "failed to close archive bucket");
                    None
                }
            })
            .collect();

        closed
            .into_iter()
            .filter_map(|path| match hash_file(&path) {
                Ok(content_hash) => {
                    let archive_path = path.to_string_lossy().replace('\\', "/");
                    info!(path = %archive_path, hash = %content_hash, "closed archive bucket");
                    Some(ArtifactManifestEntry {
                        resource_type: resource_type.to_string(),
                        archive_path,
                        content_hash,
                        produced_at: chrono::Local::now().naive_local(),
                    })
                }
                Err(source) => {
                    let err = ArchiveError::ChecksumIo { path, source };
                    warn!(error = %err, "skipping manifest entry");
                    None
                }
            })
            .collect()
    }
}
