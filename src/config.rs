//! Configuration Module
//!
//! Handles cache construction parameters, loaded from environment variables
//! or built directly in code.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

// == Public Constants ==
/// TTL sentinel meaning "effectively unbounded" (not true infinity).
pub const UNBOUNDED_TTL: Duration = Duration::from_secs(999_999_999);

/// Default notification queue size
pub const DEFAULT_NOTIFY_QUEUE_SIZE: usize = 100;

/// Converts a TTL in seconds to a duration. Negative values map to
/// [`UNBOUNDED_TTL`].
pub fn ttl_from_secs(secs: i64) -> Duration {
    if secs < 0 {
        UNBOUNDED_TTL
    } else {
        Duration::from_secs(secs as u64)
    }
}

/// Process configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// Default TTL in seconds, negative for unbounded
    pub default_ttl: i64,
    /// Size of the eviction notification queue
    pub notify_queue_size: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 1000)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds, negative = unbounded (default: -1)
    /// - `CACHE_NOTIFY_QUEUE` - Notification queue size (default: 100)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.capacity),
            default_ttl: env::var("CACHE_DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl),
            notify_queue_size: env::var("CACHE_NOTIFY_QUEUE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.notify_queue_size),
        }
    }

    /// Converts into validated cache construction options.
    pub fn cache_options(&self) -> Result<CacheOptions> {
        CacheOptions::new(self.capacity)
            .default_ttl(ttl_from_secs(self.default_ttl))
            .notify_queue_size(self.notify_queue_size)
            .validated()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1000,
            default_ttl: -1,
            notify_queue_size: DEFAULT_NOTIFY_QUEUE_SIZE,
        }
    }
}

// == Cache Options ==
/// Construction parameters for a [`Cache`](crate::Cache).
///
/// Defaults: unbounded TTL, a notification queue of
/// [`DEFAULT_NOTIFY_QUEUE_SIZE`] events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    /// Maximum number of entries, at least 1
    pub capacity: usize,
    /// TTL applied when a put does not specify one
    pub default_ttl: Duration,
    /// Bound of the notification queue, at least 1
    pub notify_queue_size: usize,
}

impl CacheOptions {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            default_ttl: UNBOUNDED_TTL,
            notify_queue_size: DEFAULT_NOTIFY_QUEUE_SIZE,
        }
    }

    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn notify_queue_size(mut self, size: usize) -> Self {
        self.notify_queue_size = size;
        self
    }

    // == Validate ==
    /// Fails fast on a capacity or queue size below 1.
    pub fn validated(self) -> Result<Self> {
        if self.capacity < 1 {
            return Err(CacheError::InvalidCapacity(self.capacity));
        }
        if self.notify_queue_size < 1 {
            return Err(CacheError::InvalidQueueSize(self.notify_queue_size));
        }
        Ok(self)
    }
}

// == Put Options ==
/// Per-call options for a put. A `None` TTL uses the cache default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutOptions {
    pub ttl: Option<Duration>,
}

impl PutOptions {
    /// Options with an explicit TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl: Some(ttl) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.capacity, 1000);
        assert_eq!(config.default_ttl, -1);
        assert_eq!(config.notify_queue_size, 100);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_CAPACITY");
        env::remove_var("CACHE_DEFAULT_TTL");
        env::remove_var("CACHE_NOTIFY_QUEUE");

        let config = Config::from_env();
        assert_eq!(config.capacity, 1000);
        assert_eq!(config.default_ttl, -1);
        assert_eq!(config.notify_queue_size, 100);
    }

    #[test]
    fn test_config_to_cache_options() {
        let config = Config {
            capacity: 10,
            default_ttl: 30,
            notify_queue_size: 5,
        };

        let options = config.cache_options().unwrap();
        assert_eq!(options.capacity, 10);
        assert_eq!(options.default_ttl, Duration::from_secs(30));
        assert_eq!(options.notify_queue_size, 5);
    }

    #[test]
    fn test_ttl_from_secs() {
        assert_eq!(ttl_from_secs(-1), UNBOUNDED_TTL);
        assert_eq!(ttl_from_secs(-500), UNBOUNDED_TTL);
        assert_eq!(ttl_from_secs(0), Duration::ZERO);
        assert_eq!(ttl_from_secs(60), Duration::from_secs(60));
    }

    #[test]
    fn test_options_reject_zero_capacity() {
        assert_eq!(
            CacheOptions::new(0).validated(),
            Err(CacheError::InvalidCapacity(0))
        );
    }

    #[test]
    fn test_options_reject_zero_queue() {
        assert_eq!(
            CacheOptions::new(1).notify_queue_size(0).validated(),
            Err(CacheError::InvalidQueueSize(0))
        );
    }

    #[test]
    fn test_put_options_default_uses_cache_ttl() {
        assert_eq!(PutOptions::default().ttl, None);
        assert_eq!(
            PutOptions::with_ttl(Duration::from_secs(1)).ttl,
            Some(Duration::from_secs(1))
        );
    }
}
