//! starsystem-rs — Rust rewrite of starsystem.
//!
//! Incrementally mirrors a user's starred Subsonic songs into a local
//! directory. Progress is tracked with a timestamp marker file under the
//! download directory; songs already on disk are never re-downloaded or
//! overwritten, and an interrupted run picks up where it left off.

#![warn(clippy::all)]

mod cli;
mod config;
mod retry;
mod state;
mod subsonic;
mod sync;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::LogLevel;
use subsonic::{Credentials, SubsonicClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    let filter = match cli.log_level {
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    let config = config::Config::from_cli(cli)?;
    tracing::debug!(?config, "Starting starsystem-rs");

    let credentials = Credentials {
        username: config.username.clone(),
        token: config.token.clone(),
        salt: config.salt.clone(),
    };
    let client = SubsonicClient::new(&config.url, credentials, config.insecure)?;

    let stats = sync::run_sync(&client, &config).await?;

    if stats.planned == 0 {
        tracing::info!("Already in sync; nothing to download");
    } else {
        tracing::info!(
            songs = stats.downloaded,
            bytes = stats.bytes,
            "Sync complete"
        );
    }
    Ok(())
}
