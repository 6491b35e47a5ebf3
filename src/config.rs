//! Runtime settings, read from the environment with defaults.

use std::env;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::id::ID_LENGTH;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Dispatcher and scheduler settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Ceiling on calls dispatched per second.
    pub rate: f64,
    pub max_retries: u32,
    #[serde(deserialize_with = "millis::deserialize")]
    pub poll_timeout: Duration,
    pub id_length: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            rate: 1.0,
            max_retries: 3,
            poll_timeout: Duration::from_secs(1),
            id_length: ID_LENGTH,
        }
    }
}

/// Recency feed sizing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Entries retained per feed.
    pub history_length: usize,
    /// Entries returned per page.
    pub max_items: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            history_length: 1000,
            max_items: 100,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub feeds: FeedConfig,
}

impl Config {
    /// Read settings from the environment. Unset variables keep their default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a variable is set but unparseable
    /// or out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let rate = parse_f64("SCRAPER_RATE", defaults.scraper.rate)?;
        if !(rate.is_finite() && rate > 0.0) {
            return Err(ConfigError::Invalid {
                name: "SCRAPER_RATE",
                reason: format!("rate must be positive, got {rate}"),
            });
        }
        let poll_ms = parse_u64(
            "SCRAPER_POLL_TIMEOUT_MS",
            defaults.scraper.poll_timeout.as_millis() as u64,
        )?;
        let id_length = parse_usize("SCRAPER_ID_LENGTH", defaults.scraper.id_length)?;
        if id_length == 0 {
            return Err(ConfigError::Invalid {
                name: "SCRAPER_ID_LENGTH",
                reason: "id length must be non-zero".into(),
            });
        }

        Ok(Self {
            scraper: ScraperConfig {
                rate,
                max_retries: parse_u32("SCRAPER_MAX_RETRIES", defaults.scraper.max_retries)?,
                poll_timeout: Duration::from_millis(poll_ms),
                id_length,
            },
            feeds: FeedConfig {
                history_length: parse_usize(
                    "RUN_FEED_HISTORY_LENGTH",
                    defaults.feeds.history_length,
                )?,
                max_items: parse_usize("RUN_FEED_MAX_ITEMS", defaults.feeds.max_items)?,
            },
        })
    }
}

fn parse<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|error| ConfigError::Invalid {
            name,
            reason: error.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn parse_f64(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    parse(name, default)
}

fn parse_u32(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    parse(name, default)
}

fn parse_u64(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    parse(name, default)
}

fn parse_usize(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    parse(name, default)
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
