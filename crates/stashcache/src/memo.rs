//! Memoizing wrappers: compute through the cache
//!
//! On a live hit the cached value is returned and the factory is not called.
//! On a miss the factory runs outside the store lock and its value is stored
//! with the default TTL. Factory errors and panics surface as [`Error`] and
//! leave the key uncached.
//!
//! There is no in-flight guard: two callers missing the same key at the same
//! time both run their factory and the later `set` wins.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;

use crate::cache::Cache;
use crate::error::{BoxError, Error, Result};
use crate::tiered::TieredCache;

fn compute_sync<V, F, E>(factory: F) -> Result<V>
where
    F: FnOnce() -> std::result::Result<V, E>,
    E: Into<BoxError>,
{
    match panic::catch_unwind(AssertUnwindSafe(factory)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(Error::Factory(e.into())),
        Err(payload) => Err(Error::from_panic(payload)),
    }
}

async fn compute<V, F, Fut, E>(factory: F) -> Result<V>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<V, E>>,
    E: Into<BoxError>,
{
    let outcome = match panic::catch_unwind(AssertUnwindSafe(factory)) {
        Ok(fut) => AssertUnwindSafe(fut).catch_unwind().await,
        Err(payload) => Err(payload),
    };

    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(Error::Factory(e.into())),
        Err(payload) => Err(Error::from_panic(payload)),
    }
}

impl<V> Cache<V>
where
    V: Clone + Send + 'static,
{
    /// Return the cached value for `key`, or run `factory` and cache its result
    pub fn with_cache_sync<F, E>(&self, key: &str, factory: F) -> Result<V>
    where
        F: FnOnce() -> std::result::Result<V, E>,
        E: Into<BoxError>,
    {
        if let Some(value) = self.get(key)? {
            return Ok(value);
        }

        let value = compute_sync(factory)?;
        self.set(key, value.clone())?;
        Ok(value)
    }

    /// Async variant of [`Cache::with_cache_sync`]; the factory may suspend
    ///
    /// No lock is held while the factory's future is pending. Cancellation
    /// and timeouts belong to the factory.
    pub async fn with_cache<F, Fut, E>(&self, key: &str, factory: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
        E: Into<BoxError>,
    {
        if let Some(value) = self.get(key)? {
            return Ok(value);
        }

        let value = compute(factory).await?;
        self.set(key, value.clone())?;
        Ok(value)
    }
}

impl<V> TieredCache<V>
where
    V: Clone + Send + 'static,
{
    /// [`Cache::with_cache_sync`] over both tiers
    pub fn with_cache_sync<F, E>(&self, key: &str, factory: F) -> Result<V>
    where
        F: FnOnce() -> std::result::Result<V, E>,
        E: Into<BoxError>,
    {
        if let Some(value) = self.get(key)? {
            return Ok(value);
        }

        let value = compute_sync(factory)?;
        self.set(key, value.clone())?;
        Ok(value)
    }

    /// [`Cache::with_cache`] over both tiers
    pub async fn with_cache<F, Fut, E>(&self, key: &str, factory: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
        E: Into<BoxError>,
    {
        if let Some(value) = self.get(key)? {
            return Ok(value);
        }

        let value = compute(factory).await?;
        self.set(key, value.clone())?;
        Ok(value)
    }
}
