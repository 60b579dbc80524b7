//! Statistics Accounting Tests
//!
//! These tests validate the bookkeeping contract: which events are counted,
//! by whom, and how per-segment counters aggregate into one snapshot.

use compute_cache::{CacheConfig, CacheStats, LoadingCache, SimpleStatsCounter, StatsCounter};
use std::convert::Infallible;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn identity_cache(config: CacheConfig) -> LoadingCache<u64, u64, impl Fn(&u64) -> Result<u64, Infallible>> {
    LoadingCache::init(config, |key: &u64| Ok::<_, Infallible>(*key), None)
}

#[test]
fn test_snapshot_additivity_single_threaded() {
    let cache = identity_cache(CacheConfig::default());

    // 30 gets over 10 distinct keys: 10 misses, 20 hits.
    for round in 0..3 {
        for key in 0..10u64 {
            cache.get(&key).unwrap();
        }
        let stats = cache.stats();
        assert_eq!(stats.request_count(), (round + 1) * 10);
    }

    let stats = cache.stats();
    assert_eq!(stats.hit_count + stats.miss_count, 30);
    assert_eq!(stats.miss_count, 10);
    assert_eq!(stats.hit_count, 20);
    assert_eq!(stats.load_success_count, 10);
}

#[test]
fn test_racing_misses_counted_per_requester() {
    let num_threads = 6;
    let cache = Arc::new(LoadingCache::init(
        CacheConfig::default(),
        |key: &String| {
            thread::sleep(Duration::from_millis(50));
            Ok::<_, Infallible>(key.clone())
        },
        None,
    ));

    let barrier = Arc::new(Barrier::new(num_threads));
    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cache.get(&"contended".to_string()).unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Every requester that did not see a loaded value is a miss, even
    // though only one computation happened.
    let stats = cache.stats();
    assert_eq!(stats.miss_count, num_threads as u64);
    assert_eq!(stats.load_success_count, 1);
    assert_eq!(stats.hit_count, 0);
}

#[test]
fn test_load_penalty_accumulates_only_on_success() {
    let cache = LoadingCache::init(
        CacheConfig::default(),
        |key: &u64| {
            thread::sleep(Duration::from_millis(10));
            Ok::<_, Infallible>(*key)
        },
        None,
    );

    cache.get(&1).unwrap();
    cache.get(&2).unwrap();

    let stats = cache.stats();
    assert_eq!(stats.load_success_count, 2);
    // Two ~10ms loads; the exact figure is scheduling-dependent.
    assert!(stats.total_load_time_nanos >= 20_000_000);
    assert!(stats.average_load_penalty_nanos() >= 10_000_000.0);
}

#[test]
fn test_stats_concurrent_with_mutation() {
    let cache = Arc::new(identity_cache(CacheConfig::default()));
    let stop = Arc::new(AtomicUsize::new(0));

    let writer_cache = Arc::clone(&cache);
    let writer_stop = Arc::clone(&stop);
    let writer = thread::spawn(move || {
        let mut key = 0u64;
        while writer_stop.load(Ordering::Relaxed) == 0 {
            writer_cache.get(&(key % 64)).unwrap();
            key += 1;
        }
        key
    });

    // Snapshots race with mutation; counters must be monotone across reads.
    let mut last = CacheStats::default();
    for _ in 0..100 {
        let stats = cache.stats();
        assert!(stats.hit_count >= last.hit_count);
        assert!(stats.miss_count >= last.miss_count);
        assert!(stats.load_success_count >= last.load_success_count);
        last = stats;
    }

    stop.store(1, Ordering::Relaxed);
    let issued = writer.join().unwrap();

    let stats = cache.stats();
    assert_eq!(stats.request_count(), issued);
}

#[test]
fn test_disabled_stats_stay_zero() {
    let cache = identity_cache(CacheConfig {
        record_stats: false,
        ..CacheConfig::default()
    });

    for key in 0..20u64 {
        cache.get(&key).unwrap();
        cache.get(&key).unwrap();
    }

    assert_eq!(cache.stats(), CacheStats::default());
    assert_eq!(cache.len(), 20);
}

#[test]
fn test_eviction_counted_invalidation_not() {
    let cache = identity_cache(CacheConfig {
        capacity: NonZeroUsize::new(2),
        segments: 1,
        record_stats: true,
    });

    cache.get(&1).unwrap();
    cache.get(&2).unwrap();
    cache.get(&3).unwrap(); // evicts 1
    assert_eq!(cache.stats().eviction_count, 1);

    assert!(cache.invalidate(&2));
    assert_eq!(cache.stats().eviction_count, 1);
}

#[test]
fn test_standalone_counter_contract() {
    // The counter is usable outside the cache, e.g. for custom plumbing.
    let counter = SimpleStatsCounter::new();
    counter.record_miss();
    counter.record_load_success(Duration::from_micros(5));
    counter.record_hit();

    let stats = counter.snapshot();
    assert_eq!(stats.request_count(), 2);
    assert_eq!(stats.hit_rate(), 0.5);
    assert_eq!(stats.miss_rate(), 0.5);
    assert_eq!(stats.average_load_penalty_nanos(), 5_000.0);
}
