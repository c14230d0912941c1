//! Cache Configuration
//!
//! Capacity and time-to-live bounds for a single cache instance.

use std::time::Duration;

use crate::error::{Error, Result};

// == Cache Config ==
/// Immutable bounds of a [`BoundedCache`](super::BoundedCache).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of live entries
    pub max_size: usize,
    /// Age after which an entry is treated as absent
    pub ttl: Duration,
}

impl CacheConfig {
    /// Creates a new config. Validation happens when the cache is built.
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self { max_size, ttl }
    }

    // == Validate ==
    /// Rejects a zero capacity.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(Error::InvalidConfig(
                "cache max_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 100,
            ttl: Duration::from_secs(300),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = CacheConfig::default();
        assert_eq!(config.max_size, 100);
        assert_eq!(config.ttl, Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_max_size_rejected() {
        let config = CacheConfig::new(0, Duration::from_secs(1));
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_ttl_allowed() {
        let config = CacheConfig::new(1, Duration::ZERO);
        assert!(config.validate().is_ok());
    }
}
