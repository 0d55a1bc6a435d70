use std::time::Duration;

use anyhow::{Context, Result};

use crate::gesture::shake::ShakeConfig;

/// Application configuration loaded from environment variables.
/// Without `DATABASE_URL` the service keeps its inventory in process memory.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    /// Default window for "expiring soon" when a request does not pass one.
    pub expiring_soon_days: u32,
    pub shake: ShakeConfig,
    /// Motion detectors unused for this long are discarded.
    pub shake_idle_timeout: Duration,
}

const DEFAULT_SHAKE_IDLE_TIMEOUT: Duration = Duration::from_secs(600);

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = ShakeConfig::default();

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            expiring_soon_days: parse_env("EXPIRING_SOON_DAYS", 3)?,
            shake: ShakeConfig {
                threshold: parse_env("SHAKE_THRESHOLD", defaults.threshold)?,
                min_interval_ms: parse_env("SHAKE_MIN_INTERVAL_MS", defaults.min_interval_ms)?,
            },
            shake_idle_timeout: Duration::from_secs(parse_env(
                "SHAKE_IDLE_TIMEOUT_SECS",
                DEFAULT_SHAKE_IDLE_TIMEOUT.as_secs(),
            )?),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: None,
            port: 8080,
            rust_log: "info".to_string(),
            expiring_soon_days: 3,
            shake: ShakeConfig::default(),
            shake_idle_timeout: DEFAULT_SHAKE_IDLE_TIMEOUT,
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
