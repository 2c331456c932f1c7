//! Runtime configuration from environment variables
//!
//!   FD_MINIMUM_PRINCIPAL  smallest principal that is projected (default 100000)
//!   FD_DATA_DIR           directory holding saved data (default .fd_planner)
//!   FD_TICK_INTERVAL_MS   countdown refresh period (default 1000)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::projection::{EngineConfig, DEFAULT_MINIMUM_PRINCIPAL};
use crate::timing::DEFAULT_TICK_INTERVAL;

pub const ENV_MINIMUM_PRINCIPAL: &str = "FD_MINIMUM_PRINCIPAL";
pub const ENV_DATA_DIR: &str = "FD_DATA_DIR";
pub const ENV_TICK_INTERVAL_MS: &str = "FD_TICK_INTERVAL_MS";

pub const DEFAULT_DATA_DIR: &str = ".fd_planner";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub minimum_principal: f64,
    pub data_dir: PathBuf,
    pub tick_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            minimum_principal: DEFAULT_MINIMUM_PRINCIPAL,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; missing or unparseable values
    /// keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let minimum_principal = sanitize_minimum(
            ENV_MINIMUM_PRINCIPAL,
            parse_or(&lookup, ENV_MINIMUM_PRINCIPAL, defaults.minimum_principal),
        );

        let data_dir = lookup(ENV_DATA_DIR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let tick_ms = parse_or(&lookup, ENV_TICK_INTERVAL_MS, defaults.tick_interval.as_millis() as u64);
        let tick_interval = if tick_ms == 0 {
            log::warn!("{} must be positive, using default", ENV_TICK_INTERVAL_MS);
            defaults.tick_interval
        } else {
            Duration::from_millis(tick_ms)
        };

        Self {
            minimum_principal,
            data_dir,
            tick_interval,
        }
    }

    /// Override the minimum principal (e.g. from a command-line flag),
    /// applying the same limits as the environment variable
    pub fn set_minimum_principal(&mut self, minimum: f64) {
        self.minimum_principal = sanitize_minimum("--minimum", minimum);
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            minimum_principal: self.minimum_principal,
        }
    }
}

/// Negative minimums clamp to zero; NaN and infinities fall back to the default.
fn sanitize_minimum(source: &str, minimum: f64) -> f64 {
    if minimum.is_finite() {
        minimum.max(0.0)
    } else {
        log::warn!("Ignoring non-finite minimum principal from {}", source);
        DEFAULT_MINIMUM_PRINCIPAL
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                log::warn!("Ignoring unparseable {}={:?}", key, raw);
                default
            }
        },
    }
}
