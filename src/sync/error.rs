use std::path::PathBuf;

use thiserror::Error;

use crate::subsonic::SubsonicError;

/// Errors while writing a downloaded song to its final path.
///
/// Everything here is fatal for the song and for the run: continuing past a
/// failed write would advance the watermark past a song that never landed.
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("failed to create directory for {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write temporary file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The download stream itself failed mid-body.
    #[error("download stream for {path} failed: {source}")]
    Stream {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to move {path} into place: {source}")]
    Rename {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MaterializeError {
    /// A broken stream is a network problem and worth a fresh attempt;
    /// anything touching the disk is not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MaterializeError::Stream { .. })
    }
}

/// A failed sync run, tagged with the operation that broke it.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to fetch starred songs")]
    FetchList(#[source] SubsonicError),

    #[error("failed to download {path}")]
    Download {
        path: String,
        #[source]
        source: SubsonicError,
    },

    #[error("failed to materialize {path}")]
    Materialize {
        path: String,
        #[source]
        source: MaterializeError,
    },
}

impl SyncError {
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::FetchList(e) => e.is_retryable(),
            SyncError::Download { source, .. } => source.is_retryable(),
            SyncError::Materialize { source, .. } => source.is_retryable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_error_retryable() {
        let e = MaterializeError::Stream {
            path: "a.mp3".into(),
            source: Box::new(std::io::Error::other("connection reset")),
        };
        assert!(e.is_retryable());
    }

    #[test]
    fn test_disk_errors_not_retryable() {
        let e = MaterializeError::Write {
            path: "a.mp3".into(),
            source: std::io::Error::other("disk full"),
        };
        assert!(!e.is_retryable());
        let e = MaterializeError::Rename {
            path: "a.mp3".into(),
            source: std::io::Error::other("read-only filesystem"),
        };
        assert!(!e.is_retryable());
    }

    #[test]
    fn test_sync_error_delegates_retryability() {
        let e = SyncError::Download {
            path: "a.mp3".into(),
            source: SubsonicError::Status {
                op: "download",
                status: 503,
            },
        };
        assert!(e.is_retryable());

        let e = SyncError::Download {
            path: "a.mp3".into(),
            source: SubsonicError::Status {
                op: "download",
                status: 404,
            },
        };
        assert!(!e.is_retryable());
    }
}
