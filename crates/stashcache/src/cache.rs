//! Cache facade: the public operation surface over the entry store

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::CacheConfig;
use crate::entry::CacheEntry;
use crate::error::{Error, Result};
use crate::stats::{CacheMetrics, CacheStats};
use crate::store::{EntryStore, Lookup};
use crate::sweeper::Sweeper;

/// State shared between the facade and the sweeper thread
struct Shared<V> {
    /// `None` once the cache is closed
    store: Mutex<Option<EntryStore<V>>>,
    config: CacheConfig,
    metrics: CacheMetrics,
}

impl<V> Shared<V> {
    fn purge_expired(&self) -> Result<usize> {
        let mut guard = self.store.lock();
        let store = guard.as_mut().ok_or(Error::Closed)?;

        let removed = store.purge_expired(Instant::now());
        self.metrics.record_expirations(removed as u64);
        Ok(removed)
    }
}

/// Thread-safe TTL cache with least-used eviction
///
/// Keys are strings; each instance holds a single value type `V`. Reads hand
/// out clones, so wrap large values in `Arc` if cloning is expensive.
///
/// The background sweeper starts in [`Cache::new`] and is stopped by
/// [`Cache::close`] or when the cache is dropped.
pub struct Cache<V> {
    shared: Arc<Shared<V>>,
    sweeper: Mutex<Option<Sweeper>>,
}

impl<V> Cache<V>
where
    V: Clone + Send + 'static,
{
    /// Create a cache and start its sweeper
    ///
    /// # Arguments
    /// * `config` - Capacity, TTL and sweep settings; zero values use defaults
    ///
    /// # Returns
    /// * `Result<Cache<V>>` - Fails only if the sweeper thread cannot be spawned
    pub fn new(config: CacheConfig) -> Result<Self> {
        let config = config.normalized();

        let shared = Arc::new(Shared {
            store: Mutex::new(Some(EntryStore::new(config.max_size))),
            config,
            metrics: CacheMetrics::new(),
        });

        let sweeper = if shared.config.sweeper {
            let sweep_shared = Arc::clone(&shared);
            Some(Sweeper::spawn(shared.config.cleanup_interval, move || {
                sweep_shared.purge_expired().unwrap_or(0)
            })?)
        } else {
            None
        };

        Ok(Self {
            shared,
            sweeper: Mutex::new(sweeper),
        })
    }

    /// Get a live value, counting a hit
    ///
    /// Expired entries are removed on the way and reported as a miss.
    ///
    /// # Arguments
    /// * `key` - Cache key
    ///
    /// # Returns
    /// * `Result<Option<V>>` - Clone of the value, or `None` if absent or expired
    pub fn get(&self, key: &str) -> Result<Option<V>> {
        let mut guard = self.shared.store.lock();
        let store = guard.as_mut().ok_or(Error::Closed)?;

        match store.get(key, Instant::now()) {
            Lookup::Hit(value) => {
                self.shared.metrics.record_hit();
                Ok(Some(value))
            }
            Lookup::Expired => {
                self.shared.metrics.record_expirations(1);
                self.shared.metrics.record_miss();
                Ok(None)
            }
            Lookup::Absent => {
                self.shared.metrics.record_miss();
                Ok(None)
            }
        }
    }

    /// Inspect a live entry without counting a hit
    pub fn entry(&self, key: &str) -> Result<Option<CacheEntry<V>>> {
        let guard = self.shared.store.lock();
        let store = guard.as_ref().ok_or(Error::Closed)?;
        Ok(store.peek(key, Instant::now()))
    }

    /// Insert or overwrite with the default TTL
    pub fn set(&self, key: impl Into<String>, value: V) -> Result<()> {
        self.insert(key.into(), value, None)
    }

    /// Insert or overwrite with an explicit TTL
    ///
    /// # Arguments
    /// * `key` - Cache key
    /// * `value` - Value to store; an existing entry is replaced and its hits reset
    /// * `ttl` - Lifetime of this entry, overriding `default_ttl`
    ///
    /// # Returns
    /// * `Result<()>` - Ok once stored, evicting the least-used entry if full
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) -> Result<()> {
        self.insert(key.into(), value, Some(ttl))
    }

    fn insert(&self, key: String, value: V, ttl: Option<Duration>) -> Result<()> {
        let ttl = ttl.unwrap_or(self.shared.config.default_ttl);

        let mut guard = self.shared.store.lock();
        let store = guard.as_mut().ok_or(Error::Closed)?;

        if let Some(evicted) = store.insert(key, value, ttl, Instant::now()) {
            debug!(key = %evicted, "evicted least-used entry");
            self.shared.metrics.record_eviction();
        }
        self.shared.metrics.record_insert();
        Ok(())
    }

    /// Remove a key
    ///
    /// # Arguments
    /// * `key` - Cache key
    ///
    /// # Returns
    /// * `Result<bool>` - Whether an entry was removed
    pub fn delete(&self, key: &str) -> Result<bool> {
        let mut guard = self.shared.store.lock();
        let store = guard.as_mut().ok_or(Error::Closed)?;
        Ok(store.remove(key))
    }

    /// Whether a live entry exists. Does not count as a hit.
    ///
    /// An expired entry is removed and counted as an expiration, as in `get`.
    pub fn has(&self, key: &str) -> Result<bool> {
        let mut guard = self.shared.store.lock();
        let store = guard.as_mut().ok_or(Error::Closed)?;

        match store.contains_live(key, Instant::now()) {
            Lookup::Hit(()) => Ok(true),
            Lookup::Expired => {
                self.shared.metrics.record_expirations(1);
                Ok(false)
            }
            Lookup::Absent => Ok(false),
        }
    }

    /// Remove every entry
    pub fn clear(&self) -> Result<()> {
        let mut guard = self.shared.store.lock();
        let store = guard.as_mut().ok_or(Error::Closed)?;
        store.clear();
        Ok(())
    }

    /// Snapshot of size, hits and pending expiry
    ///
    /// # Returns
    /// * `Result<CacheStats>` - Point-in-time view taken under the store lock
    pub fn stats(&self) -> Result<CacheStats> {
        let guard = self.shared.store.lock();
        let store = guard.as_ref().ok_or(Error::Closed)?;

        Ok(CacheStats::new(
            store.len(),
            store.max_size(),
            store.total_hits(),
            store.expired_count(Instant::now()),
        ))
    }

    /// Run one expiry sweep now, returning how many entries were removed
    pub fn purge_expired(&self) -> Result<usize> {
        self.shared.purge_expired()
    }

    /// Number of stored entries (0 once closed)
    pub fn len(&self) -> usize {
        self.shared.store.lock().as_ref().map_or(0, |store| store.len())
    }

    /// Check if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Effective configuration
    pub fn config(&self) -> &CacheConfig {
        &self.shared.config
    }

    /// Running hit/miss/eviction counters
    pub fn metrics(&self) -> &CacheMetrics {
        &self.shared.metrics
    }

    /// Check if [`Cache::close`] has run
    pub fn is_closed(&self) -> bool {
        self.shared.store.lock().is_none()
    }
}

impl<V> Cache<V> {
    /// Stop the sweeper and release every entry
    ///
    /// Idempotent. Later operations return [`Error::Closed`].
    pub fn close(&self) {
        if let Some(mut sweeper) = self.sweeper.lock().take() {
            sweeper.stop();
        }

        if let Some(store) = self.shared.store.lock().take() {
            info!(entries = store.len(), "cache closed");
        }
    }
}

impl<V> Drop for Cache<V> {
    fn drop(&mut self) {
        self.close();
    }
}
