//! Entry store
//!
//! Unsynchronised map of key to [`CacheEntry`]. The facade wraps it in a
//! single lock; everything here assumes exclusive access.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use ahash::RandomState;

use crate::entry::CacheEntry;
use crate::eviction;

/// Result of a keyed lookup against the store
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Lookup<V> {
    Hit(V),
    Expired,
    Absent,
}

/// Bounded map of cache entries
pub(crate) struct EntryStore<V> {
    map: HashMap<String, CacheEntry<V>, RandomState>,
    max_size: usize,
}

impl<V> EntryStore<V> {
    /// Create an empty store holding at most `max_size` entries
    pub fn new(max_size: usize) -> Self {
        assert!(max_size > 0, "Capacity must be greater than 0");

        Self {
            map: HashMap::with_capacity_and_hasher(max_size, RandomState::new()),
            max_size,
        }
    }

    /// Liveness check without hit counting. Expired entries are removed.
    pub fn contains_live(&mut self, key: &str, now: Instant) -> Lookup<()> {
        let live = match self.map.get(key) {
            Some(entry) => entry.is_live(now),
            None => return Lookup::Absent,
        };

        if live {
            return Lookup::Hit(());
        }
        self.map.remove(key);
        Lookup::Expired
    }

    /// Insert or overwrite. Returns the evicted key when room had to be made.
    pub fn insert(&mut self, key: String, value: V, ttl: Duration, now: Instant) -> Option<String> {
        let evicted = if self.map.len() >= self.max_size && !self.map.contains_key(&key) {
            self.evict()
        } else {
            None
        };

        self.map.insert(key, CacheEntry::new(value, ttl, now));
        evicted
    }

    /// Remove a key
    pub fn remove(&mut self, key: &str) -> bool {
        self.map.remove(key).is_some()
    }

    /// Drop every entry past its TTL, returning how many went
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.map.len();
        self.map.retain(|_, entry| entry.is_live(now));
        before - self.map.len()
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Number of entries, live or not yet swept
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Entry ceiling
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Sum of hit counts over every stored entry
    pub fn total_hits(&self) -> u64 {
        self.map.values().map(|entry| entry.hit_count).sum()
    }

    /// Entries past TTL that have not been removed yet
    pub fn expired_count(&self, now: Instant) -> usize {
        self.map.values().filter(|entry| !entry.is_live(now)).count()
    }

    fn evict(&mut self) -> Option<String> {
        let victim = eviction::least_used(&self.map).map(str::to_owned)?;
        self.map.remove(&victim);
        Some(victim)
    }
}

impl<V: Clone> EntryStore<V> {
    /// Look up a live entry, counting a hit. Expired entries are removed.
    pub fn get(&mut self, key: &str, now: Instant) -> Lookup<V> {
        let Some(entry) = self.map.get_mut(key) else {
            return Lookup::Absent;
        };

        if entry.is_live(now) {
            entry.record_hit();
            return Lookup::Hit(entry.value.clone());
        }

        self.map.remove(key);
        Lookup::Expired
    }

    /// Copy of a live entry, without counting a hit or removing anything
    pub fn peek(&self, key: &str, now: Instant) -> Option<CacheEntry<V>> {
        self.map
            .get(key)
            .filter(|entry| entry.is_live(now))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[test]
    fn test_store_basic() {
        let now = Instant::now();
        let mut store = EntryStore::new(2);

        store.insert("a".to_string(), "1", TTL, now);
        store.insert("b".to_string(), "2", TTL, now);

        assert_eq!(store.peek("a", now).map(|e| e.hit_count()), Some(0));
        assert_eq!(store.get("a", now), Lookup::Hit("1"));
        assert_eq!(store.get("b", now), Lookup::Hit("2"));
        assert_eq!(store.get("c", now), Lookup::Absent);
        assert_eq!(store.len(), 2);
        assert_eq!(store.total_hits(), 2);
    }

    #[test]
    fn test_store_eviction_takes_unused() {
        let now = Instant::now();
        let mut store = EntryStore::new(2);

        store.insert("a".to_string(), 1, TTL, now);
        store.insert("b".to_string(), 2, TTL, now);
        store.get("a", now);

        let evicted = store.insert("c".to_string(), 3, TTL, now);

        assert_eq!(evicted.as_deref(), Some("b"));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("b", now), Lookup::Absent);
    }

    #[test]
    fn test_store_overwrite_does_not_evict() {
        let now = Instant::now();
        let mut store = EntryStore::new(2);

        store.insert("a".to_string(), 1, TTL, now);
        store.insert("b".to_string(), 2, TTL, now);
        store.get("a", now);

        assert_eq!(store.insert("a".to_string(), 10, TTL, now), None);
        assert_eq!(store.len(), 2);
        // overwrite resets the counter
        assert_eq!(store.total_hits(), 0);
    }

    #[test]
    fn test_store_lazy_expiry() {
        let now = Instant::now();
        let later = now + Duration::from_millis(200);
        let mut store = EntryStore::new(4);

        store.insert("short".to_string(), 1, Duration::from_millis(100), now);
        store.insert("long".to_string(), 2, TTL, now);

        assert_eq!(store.expired_count(later), 1);
        assert_eq!(store.contains_live("short", later), Lookup::Expired);
        assert_eq!(store.contains_live("short", later), Lookup::Absent);
        assert_eq!(store.contains_live("long", later), Lookup::Hit(()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("long", later), Lookup::Hit(2));
    }

    #[test]
    fn test_store_expired_get_is_not_a_hit() {
        let now = Instant::now();
        let mut store = EntryStore::new(4);

        store.insert("k".to_string(), 1, Duration::from_millis(10), now);
        assert_eq!(store.get("k", now + Duration::from_millis(20)), Lookup::Expired);
        assert_eq!(store.total_hits(), 0);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_store_purge() {
        let now = Instant::now();
        let mut store = EntryStore::new(4);

        store.insert("a".to_string(), 1, Duration::from_millis(10), now);
        store.insert("b".to_string(), 2, Duration::from_millis(10), now);
        store.insert("c".to_string(), 3, TTL, now);

        assert_eq!(store.purge_expired(now + Duration::from_millis(50)), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_remove_and_clear() {
        let now = Instant::now();
        let mut store = EntryStore::new(3);

        store.insert("a".to_string(), 1, TTL, now);
        store.insert("b".to_string(), 2, TTL, now);

        assert!(store.remove("a"));
        assert!(!store.remove("a"));

        store.clear();
        assert_eq!(store.len(), 0);
    }
}
