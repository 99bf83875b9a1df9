//! Cache entry with TTL and hit tracking

use std::time::{Duration, Instant};

/// A stored value together with its expiry and usage bookkeeping
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub(crate) value: V,
    pub(crate) created_at: Instant,
    pub(crate) ttl: Duration,
    pub(crate) hit_count: u64,
}

impl<V> CacheEntry<V> {
    /// Create a fresh entry stamped with `now`
    pub fn new(value: V, ttl: Duration, now: Instant) -> Self {
        Self {
            value,
            created_at: now,
            ttl,
            hit_count: 0,
        }
    }

    /// Stored value
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Insertion time
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of live hits recorded
    pub fn hit_count(&self) -> u64 {
        self.hit_count
    }

    /// An entry is live while its age is at most its TTL
    pub fn is_live(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) <= self.ttl
    }

    pub(crate) fn record_hit(&mut self) {
        self.hit_count = self.hit_count.saturating_add(1);
    }
}
