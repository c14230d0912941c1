//! Configuration Module
//!
//! Handles loading and managing process configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::CacheConfig;

/// Process configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding one sub-directory per entity kind
    pub data_dir: PathBuf,
    /// Maximum number of cached entries per entity kind
    pub cache_max_size: usize,
    /// Cache entry time-to-live in seconds
    pub cache_ttl_secs: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DATA_DIR` - Storage directory (default: ./data)
    /// - `CACHE_MAX_SIZE` - Cached entries per entity kind (default: 100)
    /// - `CACHE_TTL_SECS` - Cache entry TTL in seconds (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_dir: env::var("DATA_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            cache_max_size: env::var("CACHE_MAX_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_max_size),
            cache_ttl_secs: env::var("CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_ttl_secs),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
        }
    }

    /// Cache bounds for each entity store.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new(self.cache_max_size, Duration::from_secs(self.cache_ttl_secs))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            cache_max_size: 100,
            cache_ttl_secs: 300,
            server_port: 3000,
        }
    }
}
