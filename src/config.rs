//! Client configuration parsed from environment variables.
//!
//! Numeric variables that fail to parse fall back to their defaults; a range
//! that cannot be constructed is an error.

use std::time::Duration;

use crate::backend::{HttpTimeouts, SyncError};
use crate::delay::{
    DEFAULT_DELAY_INITIAL_MS, DEFAULT_DELAY_MAX_MS, DEFAULT_DELAY_MIN_MS, DEFAULT_DELAY_STEP_MS, DelayRange,
};

pub const DEFAULT_BASE_URL: &str = "https://cloudcontrooler-backend.vercel.app";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub base_url: String,
    pub range: DelayRange,
    pub initial_delay: u32,
    pub poll_interval: Duration,
    pub timeouts: HttpTimeouts,
}

impl SyncConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `CLOUDFLASH_BASE_URL`: default hosted backend
    /// - `CLOUDFLASH_DELAY_MIN_MS`: default 100
    /// - `CLOUDFLASH_DELAY_MAX_MS`: default 2000
    /// - `CLOUDFLASH_DELAY_STEP_MS`: default 100
    /// - `CLOUDFLASH_DELAY_INITIAL_MS`: default 700, clamped into range
    /// - `CLOUDFLASH_POLL_INTERVAL_MS`: default 1000, must be non-zero
    /// - `CLOUDFLASH_REQUEST_TIMEOUT_SECS`: default 10
    /// - `CLOUDFLASH_CONNECT_TIMEOUT_SECS`: default 5
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] for an invalid range or a zero poll
    /// interval.
    pub fn from_env() -> Result<Self, SyncError> {
        let base_url = std::env::var("CLOUDFLASH_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let range = DelayRange::new(
            env_parse("CLOUDFLASH_DELAY_MIN_MS", DEFAULT_DELAY_MIN_MS),
            env_parse("CLOUDFLASH_DELAY_MAX_MS", DEFAULT_DELAY_MAX_MS),
            env_parse("CLOUDFLASH_DELAY_STEP_MS", DEFAULT_DELAY_STEP_MS),
        )
        .map_err(|e| SyncError::Config(e.to_string()))?;

        let initial_delay = range.clamp(i64::from(env_parse(
            "CLOUDFLASH_DELAY_INITIAL_MS",
            DEFAULT_DELAY_INITIAL_MS,
        )));

        let poll_ms = env_parse("CLOUDFLASH_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS);
        let poll_interval = parse_poll_interval(poll_ms)?;

        let timeouts = HttpTimeouts {
            request_secs: env_parse("CLOUDFLASH_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("CLOUDFLASH_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { base_url: normalize_base_url(&base_url), range, initial_delay, poll_interval, timeouts })
    }

    /// Replace the base URL (from a CLI flag).
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }

    /// Replace the poll interval (from a CLI flag).
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] if `poll_ms` is zero.
    pub fn with_poll_interval_ms(mut self, poll_ms: u64) -> Result<Self, SyncError> {
        self.poll_interval = parse_poll_interval(poll_ms)?;
        Ok(self)
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_poll_interval(poll_ms: u64) -> Result<Duration, SyncError> {
    if poll_ms == 0 {
        return Err(SyncError::Config("poll interval must be greater than 0 ms".into()));
    }
    Ok(Duration::from_millis(poll_ms))
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
