//! # stashcache
//!
//! In-process cache with per-entry TTL, bounded capacity and least-used
//! eviction.
//!
//! ## Architecture
//! - **Entry store**: AHash map of key to entry (value, insert time, TTL, hits)
//! - **Eviction**: full scan for the fewest hits when a new key meets a full store
//! - **Expiry**: lazy on every read, plus a background sweeper thread
//! - **Memoizing**: `with_cache_sync` / `with_cache` compute through the cache
//! - **Tiering**: `TieredCache` reads L1 then L2 and promotes L2 hits
//!
//! All operations take a single lock. Share a cache across threads with `Arc`.
//!
//! ```no_run
//! use std::time::Duration;
//! use stashcache::{Cache, CacheConfig};
//!
//! let cache: Cache<String> = Cache::new(
//!     CacheConfig::new()
//!         .max_size(500)
//!         .default_ttl(Duration::from_secs(60)),
//! )?;
//!
//! cache.set("greeting", "hello".to_string())?;
//! assert_eq!(cache.get("greeting")?, Some("hello".to_string()));
//!
//! let answer = cache.with_cache_sync("answer", || {
//!     Ok::<_, stashcache::BoxError>("42".to_string())
//! })?;
//! assert_eq!(answer, "42");
//!
//! cache.close();
//! # Ok::<(), stashcache::Error>(())
//! ```

#![warn(missing_docs)]

mod cache;
mod config;
mod entry;
mod error;
mod eviction;
mod memo;
mod stats;
mod store;
mod sweeper;
mod tiered;

pub use cache::Cache;
pub use config::{CacheConfig, DEFAULT_CLEANUP_INTERVAL, DEFAULT_MAX_SIZE, DEFAULT_TTL};
pub use entry::CacheEntry;
pub use error::{BoxError, Error, Result};
pub use stats::{CacheMetrics, CacheStats};
pub use tiered::{TieredCache, TieredStats};
