use thiserror::Error;

/// Errors from talking to the Subsonic server.
///
/// `Http` and `Status` are transport-level failures; `Api` and `Malformed`
/// mean the server answered but the answer is unusable. All four are fatal
/// to a sync run, but `is_retryable()` lets the retry loop take another
/// shot at transient ones first.
#[derive(Debug, Error)]
pub enum SubsonicError {
    #[error("request to {op} failed: {source}")]
    Http {
        op: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{op} returned HTTP {status}")]
    Status { op: &'static str, status: u16 },

    #[error("Subsonic error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("malformed {op} response: {source}")]
    Malformed {
        op: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl SubsonicError {
    /// Whether this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            SubsonicError::Http { .. } => true,
            SubsonicError::Status { status, .. } => *status == 429 || *status >= 500,
            SubsonicError::Api { .. } => false,
            SubsonicError::Malformed { .. } => false,
        }
    }
}
