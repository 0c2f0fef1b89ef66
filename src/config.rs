use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::{client::DEFAULT_API_URL, ClientOptions};

pub const ENV_API_TOKEN: &str = "MONDAY_API_TOKEN";
pub const ENV_API_URL: &str = "MONDAY_API_URL";
pub const ENV_RETRY_MAX_ATTEMPTS: &str = "MONDAY_RETRY_MAX_ATTEMPTS";
pub const ENV_RETRY_BACKOFF_FACTOR: &str = "MONDAY_RETRY_BACKOFF_FACTOR";
pub const ENV_RATE_LIMIT_CALLS: &str = "MONDAY_RATE_LIMIT_CALLS";
pub const ENV_RATE_LIMIT_PERIOD: &str = "MONDAY_RATE_LIMIT_PERIOD";

/// Error raised while loading [`Settings`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing {0} environment variable")]
    Missing(&'static str),
    #[error("{0} is set but empty")]
    Empty(&'static str),
    #[error("invalid value '{value}' for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Process-level configuration, built once at startup and handed to the client.
#[derive(Clone, PartialEq)]
pub struct Settings {
    pub api_token: String,
    pub api_url: String,
    pub retry_max_attempts: u32,
    pub retry_backoff_factor: f64,
    pub rate_limit_calls: usize,
    /// Rate-limit window in seconds.
    pub rate_limit_period: u64,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("retry_max_attempts", &self.retry_max_attempts)
            .field("retry_backoff_factor", &self.retry_backoff_factor)
            .field("rate_limit_calls", &self.rate_limit_calls)
            .field("rate_limit_period", &self.rate_limit_period)
            .finish()
    }
}

impl Settings {
    /// Settings with default URL, retry and rate-limit values.
    pub fn new(api_token: impl Into<String>) -> Self {
        let defaults = ClientOptions::default();
        Self {
            api_token: api_token.into(),
            api_url: DEFAULT_API_URL.to_owned(),
            retry_max_attempts: defaults.retry_max_attempts,
            retry_backoff_factor: defaults.retry_backoff_factor,
            rate_limit_calls: defaults.rate_limit_calls,
            rate_limit_period: defaults.rate_limit_period.as_secs(),
        }
    }

    /// Loads settings from the process environment.
    ///
    /// Reads:
    /// - `MONDAY_API_TOKEN` (required)
    /// - `MONDAY_API_URL`
    /// - `MONDAY_RETRY_MAX_ATTEMPTS`, `MONDAY_RETRY_BACKOFF_FACTOR`
    /// - `MONDAY_RATE_LIMIT_CALLS`, `MONDAY_RATE_LIMIT_PERIOD` (seconds)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(ENV_API_TOKEN).ok_or(ConfigError::Missing(ENV_API_TOKEN))?;
        if token.trim().is_empty() {
            return Err(ConfigError::Empty(ENV_API_TOKEN));
        }

        let mut settings = Self::new(token.trim());
        if let Some(url) = lookup(ENV_API_URL).filter(|url| !url.trim().is_empty()) {
            settings.api_url = url.trim().to_owned();
        }
        if let Some(value) = parse_var(&lookup, ENV_RETRY_MAX_ATTEMPTS)? {
            settings.retry_max_attempts = value;
        }
        if let Some(value) = parse_var::<f64, _>(&lookup, ENV_RETRY_BACKOFF_FACTOR)? {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    name: ENV_RETRY_BACKOFF_FACTOR,
                    value: value.to_string(),
                    reason: "must be a non-negative number".to_owned(),
                });
            }
            settings.retry_backoff_factor = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_RATE_LIMIT_CALLS)? {
            settings.rate_limit_calls = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_RATE_LIMIT_PERIOD)? {
            settings.rate_limit_period = value;
        }
        Ok(settings)
    }

    /// Client options derived from these settings.
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            retry_max_attempts: self.retry_max_attempts,
            retry_backoff_factor: self.retry_backoff_factor,
            rate_limit_calls: self.rate_limit_calls,
            rate_limit_period: Duration::from_secs(self.rate_limit_period),
            ..ClientOptions::default()
        }
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|err| ConfigError::Invalid {
            name,
            value: raw.clone(),
            reason: err.to_string(),
        })
}
