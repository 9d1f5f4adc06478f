//! Watermark reconstruction from directory contents.
//!
//! When the marker file is missing or corrupt, the set of starred songs
//! already present under the sync root tells us how far previous runs got:
//! the newest starred date among them is a safe restart point. The full
//! tree walk is O(files on disk) but only runs when the fast path fails.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::watermark::Watermark;
use crate::subsonic::StarredSong;

/// Derive a watermark from the files already on disk.
///
/// Intersects the relative paths under `root` with the starred songs'
/// paths; the maximum starred date of the intersection is the watermark.
/// With no matches the result is the epoch, meaning "sync everything".
pub fn reconstruct(root: &Path, songs: &[StarredSong]) -> Watermark {
    let on_disk = relative_files(root);
    songs
        .iter()
        .filter(|song| {
            song.path
                .as_deref()
                .is_some_and(|p| on_disk.contains(Path::new(p)))
        })
        .map(|song| song.starred_at())
        .max()
        .map(Watermark::new)
        .unwrap_or_else(Watermark::epoch)
}

/// Every file under `root`, as paths relative to `root`.
///
/// Unreadable directories are skipped rather than failing the scan; a
/// missed file at worst costs one re-download.
fn relative_files(root: &Path) -> HashSet<PathBuf> {
    let mut files = HashSet::new();
    walk(root, root, &mut files);
    files
}

fn walk(dir: &Path, root: &Path, files: &mut HashSet<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("Skipping unreadable directory {}: {}", dir.display(), e);
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        match entry.file_type() {
            Ok(file_type) if file_type.is_dir() => walk(&path, root, files),
            Ok(_) => {
                if let Ok(relative) = path.strip_prefix(root) {
                    files.insert(relative.to_path_buf());
                }
            }
            Err(e) => {
                tracing::debug!("Skipping unreadable entry {}: {}", path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn song(id: &str, path: &str, starred: Option<&str>) -> StarredSong {
        StarredSong {
            id: id.into(),
            path: Some(path.into()),
            content_type: Some("audio/mpeg".into()),
            starred: starred.map(String::from),
        }
    }

    fn place(root: &Path, relative: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_reconstruct_empty_directory_is_epoch() {
        let dir = tempfile::tempdir().unwrap();
        let songs = vec![song("1", "a/one.mp3", Some("2016-01-01T00:00:00.000Z"))];
        assert_eq!(reconstruct(dir.path(), &songs), Watermark::epoch());
    }

    #[test]
    fn test_reconstruct_uses_newest_synced_song() {
        let dir = tempfile::tempdir().unwrap();
        place(dir.path(), "a/one.mp3");
        place(dir.path(), "b/two.mp3");

        let songs = vec![
            song("1", "a/one.mp3", Some("2016-01-01T00:00:00.000Z")),
            song("2", "b/two.mp3", Some("2016-02-01T00:00:00.000Z")),
            song("3", "c/three.mp3", Some("2016-03-01T00:00:00.000Z")),
        ];
        let expected = Utc.with_ymd_and_hms(2016, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(reconstruct(dir.path(), &songs), Watermark::new(expected));
    }

    #[test]
    fn test_reconstruct_ignores_unrelated_files() {
        let dir = tempfile::tempdir().unwrap();
        place(dir.path(), "cover.jpg");
        place(dir.path(), ".synced_to");

        let songs = vec![song("1", "a/one.mp3", Some("2016-01-01T00:00:00.000Z"))];
        assert_eq!(reconstruct(dir.path(), &songs), Watermark::epoch());
    }

    #[test]
    fn test_reconstruct_malformed_dates_count_as_epoch() {
        let dir = tempfile::tempdir().unwrap();
        place(dir.path(), "a/one.mp3");

        let songs = vec![song("1", "a/one.mp3", Some("not a date"))];
        assert_eq!(
            reconstruct(dir.path(), &songs),
            Watermark::new(DateTime::UNIX_EPOCH)
        );
    }

    #[test]
    fn test_relative_files_walks_nested_tree() {
        let dir = tempfile::tempdir().unwrap();
        place(dir.path(), "a/b/c/deep.mp3");
        place(dir.path(), "top.mp3");

        let files = relative_files(dir.path());
        assert!(files.contains(Path::new("a/b/c/deep.mp3")));
        assert!(files.contains(Path::new("top.mp3")));
        assert_eq!(files.len(), 2);
    }
}
