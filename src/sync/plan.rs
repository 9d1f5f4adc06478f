use std::path::Path;

use chrono::DateTime;

use crate::state::Watermark;
use crate::subsonic::StarredSong;

/// Narrow the starred list to songs the sync can handle, oldest first.
///
/// Drops non-audio entries (starred albums surface videos and podcasts too)
/// and entries without a server path, since those cannot be mapped to a
/// local file. Neither is an error. Songs with unparseable starred dates
/// sort as the epoch, i.e. first.
pub fn eligible(songs: Vec<StarredSong>) -> Vec<StarredSong> {
    let mut songs: Vec<StarredSong> = songs
        .into_iter()
        .filter(|s| s.is_audio() && s.path.is_some())
        .collect();
    songs.sort_by_key(|s| s.starred_at());
    songs
}

/// The subset of eligible songs still to be fetched, in chronological order.
///
/// A song is due when it was starred at or after the watermark, or when its
/// starred date is unknown (epoch) and therefore can never be proven synced.
/// Songs whose target path already exists are skipped unconditionally: an
/// existing file is never reopened, whatever its content.
///
/// Chronological order matters for resumability: if the run stops partway,
/// the watermark covers a contiguous prefix of completed work.
pub fn build_plan<'a>(
    eligible: &'a [StarredSong],
    root: &Path,
    watermark: Watermark,
) -> Vec<&'a StarredSong> {
    eligible
        .iter()
        .filter(|song| {
            let starred_at = song.starred_at();
            if starred_at != DateTime::UNIX_EPOCH && starred_at < watermark.timestamp() {
                return false;
            }
            match song.path.as_deref() {
                Some(relative) => !root.join(relative).exists(),
                None => false,
            }
        })
        .collect()
}
