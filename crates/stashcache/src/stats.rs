//! Cache statistics
//!
//! [`CacheStats`] is a point-in-time snapshot of the store. [`CacheMetrics`]
//! are running counters kept for the lifetime of the cache.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Snapshot of the store taken under the lock
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    /// Entries currently stored, including expired ones not yet swept
    pub size: usize,
    /// Entry ceiling
    pub max_size: usize,
    /// Sum of per-entry hit counts
    pub total_hits: u64,
    /// Stored entries already past their TTL
    pub expired_count: usize,
    /// `total_hits / size`, or 0 for an empty store
    pub hit_rate: f64,
}

impl CacheStats {
    pub(crate) fn new(size: usize, max_size: usize, total_hits: u64, expired_count: usize) -> Self {
        let hit_rate = if size == 0 {
            0.0
        } else {
            total_hits as f64 / size as f64
        };

        Self {
            size,
            max_size,
            total_hits,
            expired_count,
            hit_rate,
        }
    }
}

/// Running counters for cache activity
#[derive(Debug, Default)]
pub struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
    inserts: AtomicU64,
}

impl CacheMetrics {
    /// Create new metrics tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a live hit
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a miss (absent or expired)
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an eviction
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Record `count` entries removed for expiry
    pub fn record_expirations(&self, count: u64) {
        self.expirations.fetch_add(count, Ordering::Relaxed);
    }

    /// Record an insert
    pub fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total hits
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Get total misses
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Get total evictions
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Get total expirations
    pub fn expirations(&self) -> u64 {
        self.expirations.load(Ordering::Relaxed)
    }

    /// Get total inserts
    pub fn inserts(&self) -> u64 {
        self.inserts.load(Ordering::Relaxed)
    }

    /// Lookup hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_hit_rate() {
        let stats = CacheStats::new(4, 10, 6, 1);
        assert_eq!(stats.hit_rate, 1.5);

        let empty = CacheStats::new(0, 10, 0, 0);
        assert_eq!(empty.hit_rate, 0.0);
    }

    #[test]
    fn test_metrics_basic() {
        let metrics = CacheMetrics::new();

        metrics.record_hit();
        metrics.record_hit();
        metrics.record_miss();
        metrics.record_expirations(3);

        assert_eq!(metrics.hits(), 2);
        assert_eq!(metrics.misses(), 1);
        assert_eq!(metrics.expirations(), 3);
        assert_eq!(metrics.hit_ratio(), 2.0 / 3.0);
    }
}
