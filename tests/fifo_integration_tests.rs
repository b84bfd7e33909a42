//! Integration Tests for the FIFO cache
//!
//! Exercises the public API end to end: eviction scenarios, expiry, batch
//! semantics, the byte-buffer backend trait and concurrent access.

use std::sync::{Arc, Barrier, Once};
use std::thread;
use std::time::Duration;

use fifo_cache::{
    Cache, CacheError, CacheMetrics, CallContext, FifoCache, FifoCacheConfig, ManualClock,
    NoopMetrics,
};

// == Helper Functions ==

const CTX: CallContext = CallContext::background();

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "fifo_cache=warn".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

fn int_cache(size: usize) -> FifoCache<i64> {
    init_tracing();
    FifoCache::new(
        "ints",
        FifoCacheConfig::new(size, Duration::ZERO),
        Arc::new(NoopMetrics),
    )
}

fn put(cache: &FifoCache<i64>, key: &str, value: i64) {
    cache.put(&CTX, vec![key.to_string()], vec![value]).unwrap();
}

fn strings(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

// == Eviction Scenarios ==

#[test]
fn test_scenario_capacity_two() {
    let cache = int_cache(2);

    put(&cache, "a", 1);
    put(&cache, "b", 2);
    put(&cache, "c", 3);

    assert_eq!(cache.get(&CTX, "a"), None);
    assert_eq!(cache.get(&CTX, "b"), Some(2));
    assert_eq!(cache.get(&CTX, "c"), Some(3));

    put(&cache, "b", 20);
    put(&cache, "d", 4);

    assert_eq!(cache.get(&CTX, "c"), None);
    assert_eq!(cache.get(&CTX, "b"), Some(20));
    assert_eq!(cache.get(&CTX, "d"), Some(4));
}

#[test]
fn test_refreshed_key_survives_next_eviction() {
    let capacity = 5;
    let cache = int_cache(capacity);
    let keys: Vec<String> = (1..=capacity + 2).map(|i| format!("k{i}")).collect();

    // k1..k(C+1): k1 evicted
    for (i, key) in keys.iter().take(capacity + 1).enumerate() {
        put(&cache, key, i as i64);
    }
    assert_eq!(cache.get(&CTX, "k1"), None);

    // Refresh k2, then insert k(C+2): k3 goes, not k2
    put(&cache, "k2", 200);
    assert_eq!(cache.len(), capacity);
    put(&cache, &keys[capacity + 1], 99);

    assert_eq!(cache.get(&CTX, "k2"), Some(200));
    assert_eq!(cache.get(&CTX, "k3"), None);
    assert_eq!(cache.len(), capacity);
}

#[test]
fn test_zero_size_cache_never_hits() {
    let cache = int_cache(0);

    for i in 0..10 {
        put(&cache, &format!("k{i}"), i);
    }
    for i in 0..10 {
        assert_eq!(cache.get(&CTX, &format!("k{i}")), None);
    }
    assert!(cache.is_empty());
}

// == Expiry ==

#[test]
fn test_stale_entries_are_evicted_in_write_order() {
    init_tracing();
    let clock = Arc::new(ManualClock::new());
    let metrics = Arc::new(CacheMetrics::new());
    let cache: FifoCache<i64> = FifoCache::with_clock(
        "ttl",
        FifoCacheConfig::new(2, Duration::from_secs(30)),
        metrics.clone(),
        clock.clone(),
    );

    put(&cache, "old", 1);
    clock.advance(Duration::from_secs(20));
    put(&cache, "new", 2);
    clock.advance(Duration::from_secs(15));

    // "old" is stale, "new" is not
    assert_eq!(cache.get(&CTX, "old"), None);
    assert_eq!(cache.get(&CTX, "new"), Some(2));
    assert_eq!(cache.len(), 2);

    // The stale entry still holds its slot until a new key claims it
    put(&cache, "newer", 3);
    assert_eq!(cache.keys(), vec!["newer", "new"]);

    let stats = metrics.snapshot();
    assert_eq!(stats.gets, 2);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.stale_gets, 1);
    assert_eq!(stats.evicted, 1);
}

#[test]
fn test_from_env_config_drives_cache() {
    std::env::set_var("ITEST_FIFOCACHE_SIZE", "3");
    std::env::set_var("ITEST_FIFOCACHE_DURATION", "1m");
    let config = FifoCacheConfig::from_env_with_prefix("itest.");
    let clock = Arc::new(ManualClock::new());

    let cache: FifoCache<i64> =
        FifoCache::with_clock("env", config, Arc::new(NoopMetrics), clock.clone());
    assert_eq!(cache.capacity(), 3);
    assert_eq!(cache.validity(), Duration::from_secs(60));

    put(&cache, "a", 1);
    clock.advance(Duration::from_secs(59));
    assert_eq!(cache.get(&CTX, "a"), Some(1));
    clock.advance(Duration::from_secs(1));
    assert_eq!(cache.get(&CTX, "a"), None);
}

// == Batch Semantics ==

#[test]
fn test_mismatched_batch_is_rejected() {
    let cache = int_cache(4);
    put(&cache, "a", 1);

    let result = cache.put(&CTX, strings(&["b", "c"]), vec![2, 3, 4]);

    assert_eq!(result, Err(CacheError::LengthMismatch { keys: 2, values: 3 }));
    assert_eq!(cache.keys(), vec!["a"]);
}

#[test]
fn test_fetch_keeps_input_order() {
    let cache = int_cache(8);
    cache
        .put(&CTX, strings(&["x", "y", "z"]), vec![10, 20, 30])
        .unwrap();

    let fetched = cache.fetch(&CTX, &strings(&["z", "nope", "x", "also-nope"]));

    assert_eq!(fetched.found, vec!["z", "x"]);
    assert_eq!(fetched.values, vec![30, 10]);
    assert_eq!(fetched.missing, vec!["nope", "also-nope"]);
}

// == Backend Trait ==

#[test]
fn test_backend_trait_object_round_trip() {
    init_tracing();
    let metrics = Arc::new(CacheMetrics::new());
    let backend: Box<dyn Cache> = Box::new(FifoCache::<Vec<u8>>::new(
        "chunks",
        FifoCacheConfig::new(2, Duration::ZERO),
        metrics.clone(),
    ));

    backend
        .store(
            &CTX,
            strings(&["k1", "k2", "k3"]),
            vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()],
        )
        .unwrap();

    let fetched = backend.fetch(&CTX, &strings(&["k1", "k2", "k3"]));
    assert_eq!(fetched.found, vec!["k2", "k3"]);
    assert_eq!(fetched.values, vec![b"two".to_vec(), b"three".to_vec()]);
    assert_eq!(fetched.missing, vec!["k1"]);

    backend.stop();

    let stats = metrics.snapshot();
    assert_eq!(stats.added, 1);
    assert_eq!(stats.added_new, 3);
    assert_eq!(stats.evicted, 1);
    assert_eq!(stats.gets, 3);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries_current, 2);
}

#[test]
fn test_backend_store_mismatch() {
    let backend = FifoCache::<Vec<u8>>::new(
        "chunks",
        FifoCacheConfig::new(2, Duration::ZERO),
        Arc::new(NoopMetrics),
    );
    let backend: &dyn Cache = &backend;

    let result = backend.store(&CTX, strings(&["k1"]), vec![]);
    assert!(matches!(result, Err(CacheError::LengthMismatch { keys: 1, values: 0 })));
}

// == Concurrency ==

#[test]
fn test_cache_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FifoCache<Vec<u8>>>();
    assert_send_sync::<FifoCache<i64>>();
}

#[test]
fn test_concurrent_writers_respect_capacity() {
    let capacity = 64;
    let cache = Arc::new(int_cache(capacity));
    let writers = 8;
    let barrier = Arc::new(Barrier::new(writers));

    let handles: Vec<_> = (0..writers)
        .map(|w| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..200 {
                    let key = format!("w{w}-{}", i % 40);
                    cache.put(&CTX, vec![key], vec![i]).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.len(), capacity);
    assert_eq!(cache.keys().len(), capacity);
}

#[test]
fn test_batches_apply_in_order_under_concurrent_reads() {
    // Every batch writes one generation number under all keys. Per-key reads
    // may straddle batches, but never see a value no batch wrote or a key
    // going backwards.
    let keys = strings(&["a", "b", "c", "d"]);
    let cache = Arc::new(int_cache(keys.len()));
    let rounds = 500;

    thread::scope(|scope| {
        let writer_cache = Arc::clone(&cache);
        let writer_keys = keys.clone();
        scope.spawn(move || {
            for generation in 0..rounds {
                let values = vec![generation; writer_keys.len()];
                writer_cache.put(&CTX, writer_keys.clone(), values).unwrap();
            }
        });

        for _ in 0..4 {
            let reader_cache = Arc::clone(&cache);
            let reader_keys = keys.clone();
            scope.spawn(move || {
                let mut last_seen = vec![-1i64; reader_keys.len()];
                for _ in 0..rounds {
                    for (slot, key) in reader_keys.iter().enumerate() {
                        if let Some(generation) = reader_cache.get(&CTX, key) {
                            assert!((0..rounds).contains(&generation));
                            // Generations only move forward for any one key
                            assert!(generation >= last_seen[slot]);
                            last_seen[slot] = generation;
                        }
                    }
                }
            });
        }
    });

    // All keys end on the final generation
    let fetched = cache.fetch(&CTX, &keys);
    assert_eq!(fetched.values, vec![rounds - 1; keys.len()]);
    assert!(fetched.missing.is_empty());
}

#[test]
fn test_batches_are_never_observed_half_applied() {
    // One writer stores a..d forwards, another backwards. The write order a
    // single-lock snapshot sees must be one of the two complete batches.
    let forward = strings(&["a", "b", "c", "d"]);
    let backward: Vec<String> = forward.iter().rev().cloned().collect();
    let cache = Arc::new(int_cache(forward.len()));
    cache.put(&CTX, forward.clone(), vec![0; 4]).unwrap();

    thread::scope(|scope| {
        for batch in [forward.clone(), backward.clone()] {
            let cache = Arc::clone(&cache);
            scope.spawn(move || {
                for i in 0..500 {
                    cache.put(&CTX, batch.clone(), vec![i; 4]).unwrap();
                }
            });
        }

        let cache = Arc::clone(&cache);
        let (forward, backward) = (forward.clone(), backward.clone());
        scope.spawn(move || {
            for _ in 0..500 {
                let newest_first = cache.keys();
                assert!(
                    newest_first == backward || newest_first == forward,
                    "saw a partial batch: {newest_first:?}"
                );
            }
        });
    });
}

#[test]
fn test_concurrent_metrics_add_up() {
    init_tracing();
    let metrics = Arc::new(CacheMetrics::new());
    let cache: Arc<FifoCache<i64>> = Arc::new(FifoCache::new(
        "shared",
        FifoCacheConfig::new(16, Duration::ZERO),
        metrics.clone(),
    ));
    let threads = 4;
    let per_thread = 250;

    thread::scope(|scope| {
        for t in 0..threads {
            let cache = Arc::clone(&cache);
            scope.spawn(move || {
                for i in 0..per_thread {
                    let key = format!("k{}", (t * per_thread + i) % 32);
                    if i % 2 == 0 {
                        cache.put(&CTX, vec![key], vec![i as i64]).unwrap();
                    } else {
                        let _ = cache.get(&CTX, &key);
                    }
                }
            });
        }
    });

    let stats = metrics.snapshot();
    let total = (threads * per_thread) as u64;
    assert_eq!(stats.added, total / 2);
    assert_eq!(stats.gets, total / 2);
    assert_eq!(stats.hits() + stats.misses, stats.gets);
    assert_eq!(stats.entries_current, 16);
    assert_eq!(stats.evicted, stats.added_new - 16);
}
