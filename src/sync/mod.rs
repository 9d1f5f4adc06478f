//! Sync orchestration.
//!
//! One run is strictly sequential: fetch the starred list, work out where the
//! last run left off, then download and materialize each pending song oldest
//! first, nudging the watermark forward after each one. Any download or write
//! failure aborts the run; whatever finished stays on disk and the watermark
//! marks the restart point for the next invocation.

pub mod error;
pub mod file;
pub mod plan;

use std::path::Path;

use chrono::DateTime;

use crate::config::Config;
use crate::retry::Backoff;
use crate::state::{scan, Watermark, WatermarkStore};
use crate::subsonic::{StarredSong, SubsonicClient, SubsonicError};

pub use error::{MaterializeError, SyncError};

/// Counters for one sync run.
#[derive(Debug, Default)]
pub struct SyncStats {
    /// Audio songs with a usable path in the starred list.
    pub eligible: usize,
    /// Songs the plan selected for download.
    pub planned: usize,
    /// Songs actually written to disk.
    pub downloaded: u64,
    /// Payload bytes written.
    pub bytes: u64,
}

/// Run one full sync pass.
pub async fn run_sync(client: &SubsonicClient, config: &Config) -> Result<SyncStats, SyncError> {
    let backoff = Backoff {
        max_retries: config.max_retries,
        base_delay_secs: config.retry_delay_secs,
        ..Backoff::default()
    };

    let songs = backoff
        .run(SubsonicError::is_retryable, || client.get_starred())
        .await
        .map_err(SyncError::FetchList)?;

    let eligible = plan::eligible(songs);
    if eligible.is_empty() {
        tracing::info!("No starred songs on the server; nothing to do");
        return Ok(SyncStats::default());
    }

    let store = WatermarkStore::new(&config.directory);
    let watermark = resolve_watermark(
        &store,
        &config.directory,
        &eligible,
        config.since.map(Watermark::new),
    );
    let planned = plan::build_plan(&eligible, &config.directory, watermark);
    tracing::info!(
        eligible = eligible.len(),
        planned = planned.len(),
        "Computed sync plan"
    );

    let mut stats = SyncStats {
        eligible: eligible.len(),
        planned: planned.len(),
        ..SyncStats::default()
    };

    for song in planned {
        let Some(relative) = song.path.as_deref() else {
            continue;
        };
        let target = config.directory.join(relative);

        if config.dry_run {
            tracing::info!("[DRY RUN] Would download {}", target.display());
            continue;
        }

        let written = backoff
            .run(SyncError::is_retryable, || {
                fetch_song(client, song, relative, &target)
            })
            .await?;
        stats.downloaded += 1;
        stats.bytes += written;
        tracing::debug!(bytes = written, "Downloaded {}", relative);

        advance_watermark(&store, song);
    }

    Ok(stats)
}

/// Download one song and write it to its final path.
async fn fetch_song(
    client: &SubsonicClient,
    song: &StarredSong,
    relative: &str,
    target: &Path,
) -> Result<u64, SyncError> {
    let response = client
        .download(&song.id)
        .await
        .map_err(|e| SyncError::Download {
            path: relative.to_string(),
            source: e,
        })?;
    file::materialize(target, response.bytes_stream())
        .await
        .map_err(|e| SyncError::Materialize {
            path: relative.to_string(),
            source: e,
        })
}

/// Decide the starting watermark for this run.
///
/// Precedence: explicit `--since` override, then the marker file, then
/// reconstruction from directory contents. A corrupt marker is recovered
/// here and never surfaced.
fn resolve_watermark(
    store: &WatermarkStore,
    root: &Path,
    eligible: &[StarredSong],
    since: Option<Watermark>,
) -> Watermark {
    if let Some(forced) = since {
        tracing::info!("Starting from forced date {}", forced.timestamp());
        return forced;
    }
    match store.read() {
        Ok(Some(watermark)) => watermark,
        Ok(None) => {
            tracing::debug!("No marker file; reconstructing watermark from directory contents");
            scan::reconstruct(root, eligible)
        }
        Err(e) => {
            tracing::warn!("Unusable marker file ({}); reconstructing from directory contents", e);
            scan::reconstruct(root, eligible)
        }
    }
}

/// Move the watermark forward after a successful download.
///
/// Songs with an unknown starred date prove nothing about sync progress and
/// leave the watermark alone. Persistence failures are logged and swallowed:
/// at worst the next run re-plans from older state and skips the files it
/// finds on disk.
fn advance_watermark(store: &WatermarkStore, song: &StarredSong) {
    let starred_at = song.starred_at();
    if starred_at == DateTime::UNIX_EPOCH {
        return;
    }
    if let Err(e) = store.advance_if_newer(Watermark::new(starred_at)) {
        tracing::warn!("Failed to persist watermark: {}", e);
    }
}
