//! Two-tier cache: a fast L1 in front of an optional slower L2
//!
//! Reads check L1, then L2; an L2 hit is written back into L1. Writes go to
//! both tiers but only L1 has to succeed.

use std::time::Duration;

use serde::Serialize;
use tracing::warn;

use crate::cache::Cache;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::stats::CacheStats;

/// Per-tier statistics snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TieredStats {
    /// Fast tier
    pub l1: CacheStats,
    /// Slow tier, if configured
    pub l2: Option<CacheStats>,
}

/// L1/L2 composition of two [`Cache`] instances
pub struct TieredCache<V> {
    l1: Cache<V>,
    l2: Option<Cache<V>>,
}

impl<V> TieredCache<V>
where
    V: Clone + Send + 'static,
{
    /// Compose existing caches
    pub fn new(l1: Cache<V>, l2: Option<Cache<V>>) -> Self {
        Self { l1, l2 }
    }

    /// Build both tiers from configs
    pub fn with_configs(l1: CacheConfig, l2: Option<CacheConfig>) -> Result<Self> {
        let l1 = Cache::new(l1)?;
        let l2 = l2.map(Cache::new).transpose()?;
        Ok(Self { l1, l2 })
    }

    /// Fast tier
    pub fn l1(&self) -> &Cache<V> {
        &self.l1
    }

    /// Slow tier
    pub fn l2(&self) -> Option<&Cache<V>> {
        self.l2.as_ref()
    }

    /// Read through L1 then L2, promoting L2 hits into L1
    ///
    /// L2 failures are logged and treated as a miss.
    pub fn get(&self, key: &str) -> Result<Option<V>> {
        if let Some(value) = self.l1.get(key)? {
            return Ok(Some(value));
        }

        let Some(l2) = &self.l2 else {
            return Ok(None);
        };

        match l2.get(key) {
            Ok(Some(value)) => {
                self.l1.set(key, value.clone())?;
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                warn!(key, error = %e, "L2 read failed");
                Ok(None)
            }
        }
    }

    /// Write to both tiers with their default TTLs
    ///
    /// # Arguments
    /// * `key` - Cache key
    /// * `value` - Value stored in L1 and, when present, L2
    ///
    /// # Returns
    /// * `Result<()>` - L1's outcome; L2 failures are logged and ignored
    pub fn set(&self, key: impl Into<String>, value: V) -> Result<()> {
        self.write(key.into(), value, None)
    }

    /// Write to both tiers with an explicit TTL
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) -> Result<()> {
        self.write(key.into(), value, Some(ttl))
    }

    fn write(&self, key: String, value: V, ttl: Option<Duration>) -> Result<()> {
        let l1_ttl = ttl.unwrap_or(self.l1.config().default_ttl);
        self.l1.set_with_ttl(key.as_str(), value.clone(), l1_ttl)?;

        if let Some(l2) = &self.l2 {
            let l2_ttl = ttl.unwrap_or(l2.config().default_ttl);
            if let Err(e) = l2.set_with_ttl(key.as_str(), value, l2_ttl) {
                warn!(key = %key, error = %e, "L2 write failed, keeping L1 only");
            }
        }
        Ok(())
    }

    /// Remove from both tiers; true if either held the key
    pub fn delete(&self, key: &str) -> Result<bool> {
        let mut removed = self.l1.delete(key)?;
        if let Some(l2) = &self.l2 {
            match l2.delete(key) {
                Ok(hit) => removed |= hit,
                Err(e) => warn!(key, error = %e, "L2 delete failed"),
            }
        }
        Ok(removed)
    }

    /// Live in either tier. Does not promote.
    pub fn has(&self, key: &str) -> Result<bool> {
        if self.l1.has(key)? {
            return Ok(true);
        }
        match &self.l2 {
            Some(l2) => Ok(l2.has(key).unwrap_or(false)),
            None => Ok(false),
        }
    }

    /// Clear both tiers
    pub fn clear(&self) -> Result<()> {
        self.l1.clear()?;
        if let Some(l2) = &self.l2 {
            l2.clear()?;
        }
        Ok(())
    }

    /// Snapshot of both tiers
    pub fn stats(&self) -> Result<TieredStats> {
        Ok(TieredStats {
            l1: self.l1.stats()?,
            l2: self.l2.as_ref().map(Cache::stats).transpose()?,
        })
    }
}

impl<V> TieredCache<V> {
    /// Close both tiers
    pub fn close(&self) {
        self.l1.close();
        if let Some(l2) = &self.l2 {
            l2.close();
        }
    }
}
