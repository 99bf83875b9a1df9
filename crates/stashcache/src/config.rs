//! Cache configuration

use std::time::Duration;

/// Default entry ceiling
pub const DEFAULT_MAX_SIZE: usize = 1000;

/// Default time-to-live (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default sweeper period (1 minute)
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Construction-time settings for a [`Cache`](crate::Cache)
///
/// Zero values are treated as unset and fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries held at once
    pub max_size: usize,

    /// TTL applied when `set` is called without one
    pub default_ttl: Duration,

    /// Period of the background expiry sweep
    pub cleanup_interval: Duration,

    /// Run the background sweeper at all
    pub sweeper: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            default_ttl: DEFAULT_TTL,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            sweeper: true,
        }
    }
}

impl CacheConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry ceiling
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the default TTL
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set the sweeper period
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Disable the background sweeper; expiry stays lazy on reads
    pub fn without_sweeper(mut self) -> Self {
        self.sweeper = false;
        self
    }

    /// Replace zero values with defaults
    pub(crate) fn normalized(mut self) -> Self {
        if self.max_size == 0 {
            self.max_size = DEFAULT_MAX_SIZE;
        }
        if self.default_ttl.is_zero() {
            self.default_ttl = DEFAULT_TTL;
        }
        if self.cleanup_interval.is_zero() {
            self.cleanup_interval = DEFAULT_CLEANUP_INTERVAL;
        }
        self
    }
}
