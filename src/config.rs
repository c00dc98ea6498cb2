use std::env;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Knobs of the checkout engine.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSettings {
    /// How far a sibling pharmacy may be to lend stock.
    pub sibling_radius_km: f64,
    /// Longest wait for a listing row lock before the checkout is aborted.
    pub lock_timeout_ms: u64,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            sibling_radius_km: 25.0,
            lock_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub pool_size: u32,
    pub checkout: CheckoutSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let defaults = CheckoutSettings::default();
        Ok(Self {
            database_url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 8080)?,
            pool_size: parse_or(&lookup, "DB_POOL_SIZE", 10)?,
            checkout: CheckoutSettings {
                sibling_radius_km: parse_or(&lookup, "SIBLING_RADIUS_KM", defaults.sibling_radius_km)?,
                lock_timeout_ms: parse_or(&lookup, "LOCK_TIMEOUT_MS", defaults.lock_timeout_ms)?,
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
