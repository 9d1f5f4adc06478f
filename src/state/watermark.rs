//! Watermark persistence.
//!
//! The watermark is a single timestamp meaning "everything starred up to and
//! including this moment has been synced". It lives in a `.synced_to` marker
//! file directly under the sync root, stored as decimal epoch seconds. The
//! marker is advisory: the presence of a downloaded file is the real evidence
//! a song was synced, so every failure here is recoverable.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};

use super::error::StateError;

/// Marker file name under the sync root.
pub const MARKER_FILE: &str = ".synced_to";

/// Timestamp boundary below which all eligible songs are assumed synced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Watermark(DateTime<Utc>);

impl Watermark {
    pub fn new(at: DateTime<Utc>) -> Self {
        Watermark(at)
    }

    /// The earliest representable instant, meaning "sync everything".
    pub fn epoch() -> Self {
        Watermark(DateTime::UNIX_EPOCH)
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Reads and writes the marker file for one sync root.
pub struct WatermarkStore {
    root: PathBuf,
}

impl WatermarkStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn marker_path(&self) -> PathBuf {
        self.root.join(MARKER_FILE)
    }

    /// Load the stored watermark.
    ///
    /// `Ok(None)` means the marker file does not exist. Unparseable content
    /// or any other I/O failure is an error, which callers treat the same
    /// way as absence: rebuild from the directory contents.
    pub fn read(&self) -> Result<Option<Watermark>, StateError> {
        let path = self.marker_path();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StateError::Io { path, source: e }),
        };

        let line = content.lines().next().unwrap_or("").trim();
        match parse_epoch_line(line) {
            Some(watermark) => Ok(Some(watermark)),
            None => Err(StateError::Corrupt {
                path,
                content: line.to_string(),
            }),
        }
    }

    /// Overwrite the marker file with the given watermark.
    pub fn write(&self, watermark: Watermark) -> Result<(), StateError> {
        let path = self.marker_path();
        std::fs::write(&path, format!("{}\n", watermark.timestamp().timestamp()))
            .map_err(|e| StateError::Io { path, source: e })
    }

    /// Advance the stored watermark if `candidate` is strictly newer.
    ///
    /// The read-then-write keeps a retried or out-of-order batch from moving
    /// the watermark backward. A missing or corrupt marker counts as "no
    /// information" and is overwritten. Returns whether a write happened.
    pub fn advance_if_newer(&self, candidate: Watermark) -> Result<bool, StateError> {
        let current = self.read().unwrap_or(None);
        if current.is_some_and(|c| candidate <= c) {
            return Ok(false);
        }
        self.write(candidate)?;
        Ok(true)
    }
}

/// Parse one marker line as epoch seconds.
///
/// The original tool wrote `time.mktime` output, so float strings like
/// `1460666826.0` must parse alongside plain integers.
fn parse_epoch_line(line: &str) -> Option<Watermark> {
    let secs = match line.parse::<i64>() {
        Ok(secs) => secs,
        Err(_) => {
            let float = line.parse::<f64>().ok().filter(|f| f.is_finite())?;
            float as i64
        }
    };
    Utc.timestamp_opt(secs, 0).single().map(Watermark)
}
