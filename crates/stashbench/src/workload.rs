//! Worker threads driving the cache through its memoizing wrapper

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use rand::Rng;
use serde::Serialize;
use stashcache::{BoxError, Cache, CacheStats, TieredCache, TieredStats};
use tracing::debug;

/// Share of requests that go to the hot set
const HOT_TRAFFIC_PERCENT: u32 = 80;

/// Hot set size as a fraction of the key space
const HOT_KEYS_DIVISOR: usize = 5;

/// Anything the workers can read through
pub trait Memoized: Send + Sync + 'static {
    fn fetch<F>(&self, key: &str, factory: F) -> stashcache::Result<u64>
    where
        F: FnOnce() -> std::result::Result<u64, BoxError>;
}

impl Memoized for Cache<u64> {
    fn fetch<F>(&self, key: &str, factory: F) -> stashcache::Result<u64>
    where
        F: FnOnce() -> std::result::Result<u64, BoxError>,
    {
        self.with_cache_sync(key, factory)
    }
}

impl Memoized for TieredCache<u64> {
    fn fetch<F>(&self, key: &str, factory: F) -> stashcache::Result<u64>
    where
        F: FnOnce() -> std::result::Result<u64, BoxError>,
    {
        self.with_cache_sync(key, factory)
    }
}

/// Load shape
#[derive(Debug, Clone)]
pub struct Workload {
    pub threads: usize,
    pub keys: usize,
    pub duration: Duration,
    pub compute: Duration,
}

/// Final numbers for one run
#[derive(Debug, Serialize)]
pub struct Report {
    pub operations: u64,
    pub factory_calls: u64,
    pub ops_per_sec: f64,
    pub lookup_hit_ratio: Option<f64>,
    pub evictions: Option<u64>,
    pub cache: Option<CacheStats>,
    pub tiered: Option<TieredStats>,
}

impl Report {
    pub fn with_single(mut self, stats: CacheStats, hit_ratio: f64, evictions: u64) -> Self {
        self.cache = Some(stats);
        self.lookup_hit_ratio = Some(hit_ratio);
        self.evictions = Some(evictions);
        self
    }

    pub fn with_tiered(mut self, stats: TieredStats) -> Self {
        self.tiered = Some(stats);
        self
    }
}

impl Workload {
    pub fn run(&self, cache: Arc<Cache<u64>>) -> Result<Report> {
        self.drive(cache)
    }

    pub fn run_tiered(&self, cache: Arc<TieredCache<u64>>) -> Result<Report> {
        self.drive(cache)
    }

    fn drive<C: Memoized>(&self, cache: Arc<C>) -> Result<Report> {
        let running = Arc::new(AtomicBool::new(true));
        let operations = Arc::new(AtomicU64::new(0));
        let factory_calls = Arc::new(AtomicU64::new(0));

        let start = Instant::now();
        let handles: Vec<_> = (0..self.threads)
            .map(|id| {
                let cache = Arc::clone(&cache);
                let running = Arc::clone(&running);
                let operations = Arc::clone(&operations);
                let factory_calls = Arc::clone(&factory_calls);
                let workload = self.clone();

                thread::Builder::new()
                    .name(format!("stashbench-worker-{}", id))
                    .spawn(move || -> stashcache::Result<()> {
                        let mut rng = rand::thread_rng();
                        while running.load(Ordering::Relaxed) {
                            let key_id = workload.pick_key(&mut rng);
                            let key = format!("key:{}", key_id);

                            cache.fetch(&key, || {
                                factory_calls.fetch_add(1, Ordering::Relaxed);
                                if !workload.compute.is_zero() {
                                    thread::sleep(workload.compute);
                                }
                                Ok(key_id as u64 * 31)
                            })?;
                            operations.fetch_add(1, Ordering::Relaxed);
                        }
                        debug!(worker = id, "worker finished");
                        Ok(())
                    })
            })
            .collect::<std::io::Result<_>>()?;

        thread::sleep(self.duration);
        running.store(false, Ordering::Relaxed);

        for handle in handles {
            handle
                .join()
                .map_err(|_| anyhow!("worker thread panicked"))??;
        }

        let elapsed = start.elapsed().as_secs_f64();
        let operations = operations.load(Ordering::Relaxed);

        Ok(Report {
            operations,
            factory_calls: factory_calls.load(Ordering::Relaxed),
            ops_per_sec: if elapsed > 0.0 {
                operations as f64 / elapsed
            } else {
                0.0
            },
            lookup_hit_ratio: None,
            evictions: None,
            cache: None,
            tiered: None,
        })
    }

    fn pick_key<R: Rng>(&self, rng: &mut R) -> usize {
        let hot = (self.keys / HOT_KEYS_DIVISOR).max(1);
        if rng.gen_range(0..100) < HOT_TRAFFIC_PERCENT {
            rng.gen_range(0..hot)
        } else {
            rng.gen_range(0..self.keys)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stashcache::CacheConfig;

    fn workload() -> Workload {
        Workload {
            threads: 2,
            keys: 50,
            duration: Duration::from_millis(50),
            compute: Duration::ZERO,
        }
    }

    #[test]
    fn test_pick_key_in_range() {
        let workload = workload();
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            assert!(workload.pick_key(&mut rng) < 50);
        }
    }

    #[test]
    fn test_run_single() {
        let cache = Arc::new(Cache::new(CacheConfig::new().max_size(20)).unwrap());
        let report = workload().run(Arc::clone(&cache)).unwrap();

        assert!(report.operations > 0);
        assert!(report.factory_calls <= report.operations);
        assert!(cache.len() <= 20);
    }

    #[test]
    fn test_run_tiered() {
        let cache = Arc::new(
            TieredCache::with_configs(
                CacheConfig::new().max_size(10),
                Some(CacheConfig::new().max_size(100)),
            )
            .unwrap(),
        );
        let report = workload().run_tiered(Arc::clone(&cache)).unwrap();

        assert!(report.operations > 0);
        let stats = cache.stats().unwrap();
        assert!(stats.l1.size <= 10);
        assert!(stats.l2.unwrap().size <= 100);
    }
}
