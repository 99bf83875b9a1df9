//! Multi-threaded behaviour of the cache facade and memoizing wrapper

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use stashcache::{BoxError, Cache, CacheConfig, Error};

fn shared_cache(max_size: usize) -> Arc<Cache<usize>> {
    Arc::new(
        Cache::new(
            CacheConfig::new()
                .max_size(max_size)
                .cleanup_interval(Duration::from_millis(5)),
        )
        .unwrap(),
    )
}

#[test]
fn concurrent_writers_respect_capacity() {
    let cache = shared_cache(64);
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..500 {
                    cache.set(format!("t{}-k{}", t, i), i).unwrap();
                    let _ = cache.get(&format!("t{}-k{}", t, i / 2)).unwrap();
                    assert!(cache.len() <= 64);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let stats = cache.stats().unwrap();
    assert_eq!(stats.size, 64);
    assert_eq!(stats.max_size, 64);
    assert!(cache.metrics().evictions() >= 8 * 500 - 64);
}

#[test]
fn same_key_read_your_write() {
    let cache = shared_cache(1000);
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let key = format!("own-{}", t);
                for i in 0..200 {
                    cache.set(key.as_str(), i).unwrap();
                    assert_eq!(cache.get(&key).unwrap(), Some(i));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn racing_cold_key_may_compute_twice_but_stores_once() {
    let cache = shared_cache(100);
    let calls = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cache
                    .with_cache_sync("cold", || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(20));
                        Ok::<_, BoxError>(t)
                    })
                    .unwrap()
            })
        })
        .collect();

    let results: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // Duplicate computation under a race is accepted; the store stays consistent.
    let calls = calls.load(Ordering::SeqCst);
    assert!((1..=4).contains(&calls));
    assert_eq!(cache.len(), 1);

    let stored = cache.get("cold").unwrap().unwrap();
    assert!(results.contains(&stored));
}

#[test]
fn close_while_in_use() {
    let cache = shared_cache(100);
    let worker = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            let deadline = Instant::now() + Duration::from_secs(10);
            let mut i = 0usize;
            while Instant::now() < deadline {
                match cache.set(format!("k{}", i % 50), i) {
                    Ok(()) => i += 1,
                    Err(Error::Closed) => return true,
                    Err(e) => panic!("unexpected error: {}", e),
                }
            }
            false
        })
    };

    thread::sleep(Duration::from_millis(2));
    cache.close();

    assert!(worker.join().unwrap(), "writer never observed the close");
    assert!(cache.is_closed());
    assert_eq!(cache.len(), 0);
}
