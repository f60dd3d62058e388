//! Configuration Module
//!
//! Handles loading and managing configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Runtime configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// TTL in minutes for values memoized by the sample endpoints
    pub default_ttl_minutes: u32,
    /// Expiry sweep interval in seconds, 0 disables the sweep task
    pub sweep_interval: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL_MINUTES` - TTL of memoized values in minutes (default: 10)
    /// - `SWEEP_INTERVAL` - Expiry sweep frequency in seconds (default: 60)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    ///
    /// Unset variables fall back to their defaults; set but unparsable ones
    /// are rejected.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            default_ttl_minutes: read_var("DEFAULT_TTL_MINUTES", defaults.default_ttl_minutes)?,
            sweep_interval: read_var("SWEEP_INTERVAL", defaults.sweep_interval)?,
            server_port: read_var("SERVER_PORT", defaults.server_port)?,
        })
    }

    /// Interval of the sweep task, or None when it is disabled.
    pub fn sweep_period(&self) -> Option<Duration> {
        (self.sweep_interval > 0).then(|| Duration::from_secs(self.sweep_interval))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl_minutes: 10,
            sweep_interval: 60,
            server_port: 3000,
        }
    }
}

fn read_var<T: FromStr>(var: &'static str, default: T) -> Result<T> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| CacheError::InvalidConfig { var, value }),
        Err(_) => Ok(default),
    }
}
