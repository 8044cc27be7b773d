//! Configuration and settings management
//!
//! Loads settings from environment variables (optionally backed by a `.env`
//! file and local config files) and validates the credential triple the bot
//! cannot run without.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

const fn default_poll_interval_secs() -> u64 {
    600
}

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Practicum API OAuth token
    pub practicum_token: Option<String>,

    /// Telegram Bot API token
    pub telegram_token: Option<String>,

    /// Target chat: numeric id or `@channelname`
    pub telegram_chat_id: Option<String>,

    /// Seconds to sleep between poll cycles
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Optional outbound HTTP timeout in seconds; no timeout when unset
    pub http_timeout_secs: Option<u64>,
}

/// The validated credential triple, constructed once at startup and passed
/// into the client and notifier.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Practicum API OAuth token
    pub practicum_token: String,
    /// Telegram Bot API token
    pub telegram_token: String,
    /// Target chat identifier
    pub telegram_chat_id: String,
}

impl Settings {
    /// Create new settings by loading from environment and optional files.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a source fails to load or deserialize.
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::default())
            .build()?
            .try_deserialize()
    }

    /// Validate the credential triple.
    ///
    /// # Errors
    ///
    /// Returns the names of every missing or empty variable, so the startup
    /// diagnostic can list them all at once.
    pub fn credentials(&self) -> Result<Credentials, Vec<&'static str>> {
        let mut missing = Vec::new();

        let practicum_token = required(&self.practicum_token, "PRACTICUM_TOKEN", &mut missing);
        let telegram_token = required(&self.telegram_token, "TELEGRAM_TOKEN", &mut missing);
        let telegram_chat_id = required(&self.telegram_chat_id, "TELEGRAM_CHAT_ID", &mut missing);

        if missing.is_empty() {
            Ok(Credentials {
                practicum_token,
                telegram_token,
                telegram_chat_id,
            })
        } else {
            Err(missing)
        }
    }

    /// Pause between poll cycles.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Outbound HTTP timeout, if one is configured.
    #[must_use]
    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.map(Duration::from_secs)
    }
}

fn required(
    value: &Option<String>,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.clone(),
        _ => {
            missing.push(name);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Settings;

    fn settings(
        practicum: Option<&str>,
        telegram: Option<&str>,
        chat: Option<&str>,
    ) -> Settings {
        Settings {
            practicum_token: practicum.map(str::to_owned),
            telegram_token: telegram.map(str::to_owned),
            telegram_chat_id: chat.map(str::to_owned),
            poll_interval_secs: 600,
            http_timeout_secs: None,
        }
    }

    #[test]
    fn full_triple_passes() {
        let creds = settings(Some("p"), Some("t"), Some("42"))
            .credentials()
            .expect("all variables present");
        assert_eq!(creds.practicum_token, "p");
        assert_eq!(creds.telegram_chat_id, "42");
    }

    #[test]
    fn every_missing_variable_is_reported() {
        let err = settings(None, Some("t"), None)
            .credentials()
            .expect_err("two variables missing");
        assert_eq!(err, vec!["PRACTICUM_TOKEN", "TELEGRAM_CHAT_ID"]);
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let err = settings(Some("p"), Some("  "), Some("42"))
            .credentials()
            .expect_err("blank token");
        assert_eq!(err, vec!["TELEGRAM_TOKEN"]);
    }

    #[test]
    fn default_poll_interval_is_ten_minutes() {
        let s = settings(Some("p"), Some("t"), Some("42"));
        assert_eq!(s.poll_interval().as_secs(), 600);
        assert!(s.http_timeout().is_none());
    }
}
