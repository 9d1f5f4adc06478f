use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Application configuration, resolved from the CLI.
pub struct Config {
    pub url: String,
    pub username: String,
    pub token: String,
    pub salt: String,
    pub directory: PathBuf,
    pub since: Option<DateTime<Utc>>,
    pub insecure: bool,
    pub dry_run: bool,
    pub max_retries: u32,
    pub retry_delay_secs: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .field("directory", &self.directory)
            .field("since", &self.since)
            .field("insecure", &self.insecure)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Config {
    pub fn from_cli(cli: crate::cli::Cli) -> anyhow::Result<Self> {
        let since = cli.since.as_deref().map(parse_date_or_interval).transpose()?;

        Ok(Self {
            url: cli.url,
            username: cli.user,
            token: cli.token,
            salt: cli.salt,
            directory: expand_tilde(&cli.path),
            since,
            insecure: cli.insecure,
            dry_run: cli.dry_run,
            max_retries: cli.max_retries,
            retry_delay_secs: cli.retry_delay,
        })
    }
}

/// Parse a human-friendly date spec into a concrete timestamp.
///
/// Supports a relative interval (`"20d"` = 20 days ago), an ISO date
/// (midnight UTC), or an ISO datetime. Starred dates from the server are
/// UTC, so the comparison boundary is interpreted as UTC too.
pub(crate) fn parse_date_or_interval(s: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Some(days_str) = s.strip_suffix('d') {
        if let Ok(days) = days_str.parse::<i64>() {
            return Ok(Utc::now() - chrono::Duration::days(days));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive_dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive_dt.and_utc());
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt.and_utc());
    }
    anyhow::bail!(
        "Cannot parse '{}' as a date. Expected ISO date (2016-04-14), \
         datetime (2016-04-14T20:07:06), or interval (20d)",
        s
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse_cli(args: &[&str]) -> crate::cli::Cli {
        let mut full = vec![
            "starsystem-rs",
            "-i",
            "https://music.example.com",
            "-u",
            "alice",
            "-t",
            "deadbeef",
            "-s",
            "c19b2d",
            "-p",
            "/music",
        ];
        full.extend_from_slice(args);
        crate::cli::Cli::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_expand_tilde_with_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/Music"), home.join("Music"));
        }
    }

    #[test]
    fn test_expand_tilde_no_prefix() {
        assert_eq!(expand_tilde("/music"), PathBuf::from("/music"));
        assert_eq!(expand_tilde("relative"), PathBuf::from("relative"));
    }

    #[test]
    fn test_parse_date_iso() {
        let dt = parse_date_or_interval("2016-04-14").unwrap();
        assert_eq!(dt, NaiveDate::from_ymd_opt(2016, 4, 14).unwrap().and_hms_opt(0, 0, 0).unwrap().and_utc());
    }

    #[test]
    fn test_parse_datetime_iso() {
        let dt = parse_date_or_interval("2016-04-14T20:07:06").unwrap();
        assert_eq!(
            dt,
            NaiveDate::from_ymd_opt(2016, 4, 14).unwrap().and_hms_opt(20, 7, 6).unwrap().and_utc()
        );
    }

    #[test]
    fn test_parse_interval_days() {
        let before = Utc::now() - chrono::Duration::days(10);
        let dt = parse_date_or_interval("10d").unwrap();
        let after = Utc::now() - chrono::Duration::days(10);
        assert!(dt >= before - chrono::Duration::seconds(1));
        assert!(dt <= after + chrono::Duration::seconds(1));
    }

    #[test]
    fn test_parse_invalid_date() {
        assert!(parse_date_or_interval("not-a-date").is_err());
        assert!(parse_date_or_interval("").is_err());
    }

    #[test]
    fn test_from_cli_required_fields() {
        let config = Config::from_cli(parse_cli(&[])).unwrap();
        assert_eq!(config.url, "https://music.example.com");
        assert_eq!(config.username, "alice");
        assert_eq!(config.directory, PathBuf::from("/music"));
        assert!(config.since.is_none());
        assert!(!config.insecure);
        assert!(!config.dry_run);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.retry_delay_secs, 5);
    }

    #[test]
    fn test_from_cli_since_and_flags() {
        let config =
            Config::from_cli(parse_cli(&["-S", "2016-04-14", "-I", "--dry-run"])).unwrap();
        assert!(config.since.is_some());
        assert!(config.insecure);
        assert!(config.dry_run);
    }

    #[test]
    fn test_missing_required_option_fails() {
        assert!(crate::cli::Cli::try_parse_from(["starsystem-rs", "-u", "alice"]).is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = Config::from_cli(parse_cli(&[])).unwrap();
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("deadbeef"));
    }
}
