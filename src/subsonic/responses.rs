use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

/// Timestamp format used by Subsonic for `starred` dates,
/// e.g. `2016-04-14T20:07:06.000Z`.
const STARRED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Top-level wrapper every Subsonic endpoint returns.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(rename = "subsonic-response")]
    pub subsonic_response: SubsonicResponse,
}

#[derive(Debug, Deserialize)]
pub struct SubsonicResponse {
    #[allow(dead_code)]
    pub status: Option<String>,
    pub error: Option<ApiError>,
    pub starred: Option<Starred>,
}

/// Application-level error reported inside a 2xx response body.
#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct Starred {
    #[serde(default)]
    pub song: Vec<StarredSong>,
}

/// A song the user has starred on the server.
///
/// Only the fields the sync needs are deserialized; everything else in the
/// record is ignored. `path` and `starred` are optional because the server
/// does not guarantee them for every entry.
#[derive(Debug, Clone, Deserialize)]
pub struct StarredSong {
    pub id: String,
    pub path: Option<String>,
    #[serde(rename = "contentType")]
    pub content_type: Option<String>,
    pub starred: Option<String>,
}

impl StarredSong {
    /// When this song was starred.
    ///
    /// Absent or unparseable dates map to the Unix epoch, which sorts the
    /// song earliest and keeps it permanently due for sync.
    pub fn starred_at(&self) -> DateTime<Utc> {
        self.starred
            .as_deref()
            .and_then(|s| NaiveDateTime::parse_from_str(s, STARRED_FORMAT).ok())
            .map(|n| n.and_utc())
            .unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Whether the declared content type is playable audio.
    pub fn is_audio(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("audio"))
    }
}
