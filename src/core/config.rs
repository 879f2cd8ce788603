use crate::error::{PaxError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_UPLOAD_ENDPOINT: &str = "https://api.imgur.com/3/upload";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_PROMPT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_NOTICE_DURATION: Duration = Duration::from_secs(5);
/// Upper bound for every configurable wait.
pub const MAX_WAIT_SECS: u64 = 86_400;

/// Process-wide settings, read once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// Flat folder polled for new screenshots
    pub watch_dir: PathBuf,
    /// Archive root for files that were sent to the image host
    pub upload_dir: PathBuf,
    /// Archive root for files kept local only
    pub save_dir: PathBuf,
    /// Image host client identifier
    pub client_id: String,
    pub endpoint: String,
    pub poll_interval: Duration,
    pub prompt_timeout: Duration,
    pub notice_duration: Duration,
    /// No timeout unless explicitly configured
    pub http_timeout: Option<Duration>,
}

impl Config {
    pub fn new(
        watch_dir: impl Into<PathBuf>,
        upload_dir: impl Into<PathBuf>,
        save_dir: impl Into<PathBuf>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            watch_dir: watch_dir.into(),
            upload_dir: upload_dir.into(),
            save_dir: save_dir.into(),
            client_id: client_id.into(),
            endpoint: DEFAULT_UPLOAD_ENDPOINT.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            prompt_timeout: DEFAULT_PROMPT_TIMEOUT,
            notice_duration: DEFAULT_NOTICE_DURATION,
            http_timeout: None,
        }
    }

    /// Build the configuration from parsed command-line/environment values.
    pub fn from_matches(matches: &clap::ArgMatches) -> Result<Self> {
        let required = |name: &str| -> Result<String> {
            matches
                .get_one::<String>(name)
                .cloned()
                .ok_or_else(|| PaxError::config(format!("missing required setting '{}'", name)))
        };

        let mut config = Config::new(
            required("watch-dir")?,
            required("upload-dir")?,
            required("save-dir")?,
            required("client-id")?,
        );

        if let Some(endpoint) = matches.get_one::<String>("endpoint") {
            config.endpoint = endpoint.clone();
        }
        if let Some(&ms) = matches.get_one::<u64>("interval-ms") {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(&secs) = matches.get_one::<u64>("prompt-timeout") {
            config.prompt_timeout = Duration::from_secs(secs);
        }
        if let Some(&secs) = matches.get_one::<u64>("notice-secs") {
            config.notice_duration = Duration::from_secs(secs);
        }
        config.http_timeout = matches
            .get_one::<u64>("http-timeout")
            .map(|&secs| Duration::from_secs(secs));

        Ok(config)
    }

    /// Fail fast before the watch loop starts.
    ///
    /// The save directory is not checked: it is created on first use.
    pub fn validate(&self) -> Result<()> {
        require_dir(&self.watch_dir, "Source directory")?;
        require_dir(&self.upload_dir, "Upload directory")?;

        if self.client_id.trim().is_empty() {
            return Err(PaxError::config("image host client id is empty"));
        }
        if self.poll_interval.is_zero() {
            return Err(PaxError::config("poll interval must be greater than zero"));
        }

        let max = Duration::from_secs(MAX_WAIT_SECS);
        let waits = [
            ("poll interval", Some(self.poll_interval)),
            ("prompt timeout", Some(self.prompt_timeout)),
            ("notice duration", Some(self.notice_duration)),
            ("HTTP timeout", self.http_timeout),
        ];
        for (label, wait) in waits {
            if wait.is_some_and(|w| w > max) {
                return Err(PaxError::config(format!(
                    "{} must not exceed {} seconds",
                    label, MAX_WAIT_SECS
                )));
            }
        }

        Ok(())
    }
}

fn require_dir(path: &Path, label: &str) -> Result<()> {
    if !path.exists() {
        return Err(PaxError::config(format!(
            "{} does not exist: {}",
            label,
            path.display()
        )));
    }
    if !path.is_dir() {
        return Err(PaxError::config(format!(
            "{} is not a directory: {}",
            label,
            path.display()
        )));
    }
    Ok(())
}
