use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use futures_util::{Stream, StreamExt};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::error::MaterializeError;

/// Co-located temp path for a target: `song.mp3` -> `song.mp3.part`.
///
/// Same directory means the final rename never crosses a filesystem
/// boundary, which is what makes it atomic.
fn part_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("download"));
    name.push(".part");
    target.with_file_name(name)
}

/// Stream a download into `target` with all-or-nothing semantics.
///
/// Creates missing parent directories, writes the body chunk by chunk into a
/// `.part` file next to the target, syncs it to storage, then renames it into
/// place. A crash at any point leaves the target either absent or complete,
/// never partial. On failure the `.part` file is removed best-effort.
///
/// The rename clobbers whatever is at `target`; the planner's existence check
/// is what keeps this from ever firing against a file the user kept.
pub async fn materialize<S, B, E>(target: &Path, mut body: S) -> Result<u64, MaterializeError>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::error::Error + Send + Sync + 'static,
{
    if let Some(parent) = target.parent() {
        // Racing a concurrent mkdir is fine; create_dir_all succeeds if the
        // directory is already there.
        fs::create_dir_all(parent)
            .await
            .map_err(|e| MaterializeError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }

    let part = part_path(target);
    let written = match write_part(&part, target, &mut body).await {
        Ok(written) => written,
        Err(e) => {
            remove_part(&part).await;
            return Err(e);
        }
    };

    if let Err(e) = fs::rename(&part, target).await {
        remove_part(&part).await;
        return Err(MaterializeError::Rename {
            path: target.to_path_buf(),
            source: e,
        });
    }

    Ok(written)
}

async fn write_part<S, B, E>(
    part: &Path,
    target: &Path,
    body: &mut S,
) -> Result<u64, MaterializeError>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::error::Error + Send + Sync + 'static,
{
    let write_err = |source| MaterializeError::Write {
        path: part.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(part)
        .await
        .map_err(write_err)?;

    let mut written: u64 = 0;
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| MaterializeError::Stream {
            path: target.to_path_buf(),
            source: Box::new(e),
        })?;
        file.write_all(chunk.as_ref()).await.map_err(write_err)?;
        written += chunk.as_ref().len() as u64;
    }

    file.flush().await.map_err(write_err)?;
    // Durably on storage before the rename makes it visible.
    file.sync_all().await.map_err(write_err)?;

    Ok(written)
}

/// Best-effort cleanup of a leftover `.part` file.
///
/// Absence is fine (the failure may have come before the file existed);
/// any other removal error is reported but never masks the original one.
async fn remove_part(part: &Path) {
    if let Err(e) = fs::remove_file(part).await {
        if e.kind() != ErrorKind::NotFound {
            tracing::warn!("Failed to remove temporary file {}: {}", part.display(), e);
        }
    }
}
