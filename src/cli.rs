use clap::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Parser, Debug)]
#[command(
    name = "starsystem-rs",
    about = "Mirror starred Subsonic songs to a local directory"
)]
pub struct Cli {
    /// URI of the Subsonic server
    #[arg(short = 'i', long)]
    pub url: String,

    /// Username on the Subsonic server
    #[arg(short = 'u', long)]
    pub user: String,

    /// API token for the given username/salt combination.
    /// WARNING: passing via --token is visible in process listings.
    /// Prefer the SUBSONIC_TOKEN environment variable instead.
    /// See: http://www.subsonic.org/pages/api.jsp
    #[arg(short = 't', long, env = "SUBSONIC_TOKEN")]
    pub token: String,

    /// Salt used to generate the API token
    #[arg(short = 's', long)]
    pub salt: String,

    /// Path to the directory whither songs will be downloaded
    #[arg(short = 'p', long)]
    pub path: String,

    /// Sync all songs starred since this date, overriding saved progress.
    /// Accepts an ISO date (2016-04-14), datetime (2016-04-14T20:07:06),
    /// or relative interval (20d).
    #[arg(short = 'S', long)]
    pub since: Option<String>,

    /// Don't verify SSL certificates. Verification is enabled by default.
    #[arg(short = 'I', long)]
    pub insecure: bool,

    /// Log what would be downloaded without touching the server or disk
    #[arg(long)]
    pub dry_run: bool,

    /// Retries per request on transient failures
    #[arg(long, default_value_t = 2)]
    pub max_retries: u32,

    /// Base delay in seconds between retries
    #[arg(long, default_value_t = 5)]
    pub retry_delay: u64,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}
