//! Draft configuration, read from the environment after `.env` is loaded.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_CUBE_FILE: &str = "draft_files/cube.txt";
pub const DEFAULT_CARD_LIMIT: usize = 60;
pub const DEFAULT_PREFETCH_WORKERS: usize = 8;
pub const DEFAULT_LOOKUP_INTERVAL_MS: u64 = 100;
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SCRYFALL_URL: &str = "https://api.scryfall.com";

#[derive(Debug, Clone)]
pub struct DraftConfig {
    /// Deck list used by `new` when no custom list has been loaded.
    pub cube_file: String,
    /// Maximum number of cards kept in the shuffled deck.
    pub card_limit: usize,
    /// Number of metadata fetches allowed in flight at once.
    pub prefetch_workers: usize,
    pub lookup_interval: Duration,
    pub lookup_timeout: Duration,
    pub scryfall_url: String,
}

impl Default for DraftConfig {
    fn default() -> Self {
        DraftConfig {
            cube_file: DEFAULT_CUBE_FILE.to_string(),
            card_limit: DEFAULT_CARD_LIMIT,
            prefetch_workers: DEFAULT_PREFETCH_WORKERS,
            lookup_interval: Duration::from_millis(DEFAULT_LOOKUP_INTERVAL_MS),
            lookup_timeout: Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS),
            scryfall_url: DEFAULT_SCRYFALL_URL.to_string(),
        }
    }
}

impl DraftConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = DraftConfig {
            cube_file: lookup("WINSTON_CUBE_FILE").unwrap_or_else(|| DEFAULT_CUBE_FILE.to_string()),
            card_limit: parse_or(&lookup, "WINSTON_CARD_LIMIT", DEFAULT_CARD_LIMIT)?,
            prefetch_workers: parse_or(&lookup, "WINSTON_PREFETCH_WORKERS", DEFAULT_PREFETCH_WORKERS)?,
            lookup_interval: Duration::from_millis(parse_or(
                &lookup,
                "WINSTON_LOOKUP_INTERVAL_MS",
                DEFAULT_LOOKUP_INTERVAL_MS,
            )?),
            lookup_timeout: Duration::from_secs(parse_or(
                &lookup,
                "WINSTON_LOOKUP_TIMEOUT_SECS",
                DEFAULT_LOOKUP_TIMEOUT_SECS,
            )?),
            scryfall_url: lookup("WINSTON_SCRYFALL_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_SCRYFALL_URL.to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.card_limit == 0 {
            return Err(ConfigError::Invalid {
                var: "WINSTON_CARD_LIMIT".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.prefetch_workers == 0 {
            return Err(ConfigError::Invalid {
                var: "WINSTON_PREFETCH_WORKERS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        Some(value) => value.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
            var: var.to_string(),
            reason: format!("{} ({})", err, value),
        }),
        None => Ok(default),
    }
}
