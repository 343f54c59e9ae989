//! Structured error types for the archive engine.
//!
//! Malformed record lines never surface as errors: they are skipped where
//! they are read, so sparse or dirty source data still archives.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    /// A source file or directory could not be read. The file is skipped.
    #[error("cannot read source {}: {source}", path.display())]
    SourceIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An output container could not be created or written.
    #[error("cannot write archive {}: {source}", path.display())]
    OutputIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A finished container could not be read back for hashing.
    #[error("cannot checksum archive {}: {source}", path.display())]
    ChecksumIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ArchiveError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::SourceIo { path, .. } | Self::OutputIo { path, .. } | Self::ChecksumIo { path, .. } => {
                path
            }
        }
    }
}
