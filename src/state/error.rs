//! Error types for the sync-state module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from reading or writing the watermark marker file.
///
/// These are always recoverable: a missing or corrupt marker falls back to
/// directory reconstruction, and a failed write is logged and swallowed
/// because the files on disk, not the marker, are the ground truth for what
/// has been synced.
#[derive(Debug, Error)]
pub enum StateError {
    /// The marker file exists but its content is not a timestamp.
    #[error("marker file {path} is corrupt: {content:?}")]
    Corrupt { path: PathBuf, content: String },

    /// The marker file could not be read or written.
    #[error("marker file {path} I/O error: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
