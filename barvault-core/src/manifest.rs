//! Artifact manifest entries produced when a policy releases its buckets.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::Path;

/// One finished archive, ready for publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifestEntry {
    /// Lowercase resource key, e.g. `sse.m5`.
    pub resource_type: String,
    pub archive_path: String,
    /// Lowercase hex BLAKE3 digest of the archive bytes.
    pub content_hash: String,
    pub produced_at: NaiveDateTime,
}

/// Stream a file through BLAKE3 and return the lowercase hex digest.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize().to_hex().to_string())
}
