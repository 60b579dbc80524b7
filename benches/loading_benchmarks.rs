//! Loading Cache Benchmarks
//!
//! Measures the hit path, the miss-load-evict path, stats aggregation, and
//! throughput under thread contention.

use compute_cache::{CacheConfig, LoadingCache};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::convert::Infallible;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;

fn make_cache(capacity: Option<usize>, segments: usize) -> LoadingCache<u64, u64, impl Fn(&u64) -> Result<u64, Infallible>> {
    let config = CacheConfig {
        capacity: capacity.and_then(NonZeroUsize::new),
        segments,
        record_stats: true,
    };
    LoadingCache::init(config, |key: &u64| Ok::<_, Infallible>(key.wrapping_mul(31)), None)
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Loading Cache");

    // Hit path: single hot key, always loaded.
    {
        let cache = make_cache(None, 16);
        cache.get(&42).unwrap();
        group.bench_function("get_hit", |b| {
            b.iter(|| cache.get(black_box(&42)).unwrap());
        });
    }

    // Cold path: every lookup is a miss plus a cheap load, with eviction
    // pressure keeping the cache bounded.
    {
        let cache = make_cache(Some(1024), 16);
        let mut key = 0u64;
        group.bench_function("get_miss_load_evict", |b| {
            b.iter(|| {
                key = key.wrapping_add(1);
                cache.get(black_box(&key)).unwrap()
            });
        });
    }

    // Stats aggregation across 16 segments.
    {
        let cache = make_cache(None, 16);
        for i in 0..10_000u64 {
            cache.get(&i).unwrap();
        }
        group.bench_function("stats_snapshot", |b| {
            b.iter(|| black_box(cache.stats()));
        });
    }

    group.finish();

    // Throughput with contending threads on a shared working set.
    let mut concurrent = c.benchmark_group("Concurrent Access");
    for threads in [2usize, 8] {
        concurrent.bench_function(format!("get_{threads}_threads"), |b| {
            b.iter(|| {
                let cache = Arc::new(make_cache(None, 16));
                let handles: Vec<_> = (0..threads)
                    .map(|t| {
                        let cache = Arc::clone(&cache);
                        thread::spawn(move || {
                            for i in 0..1_000u64 {
                                let key = (t as u64 * 37 + i) % 256;
                                let _ = cache.get(&key);
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
            });
        });
    }
    concurrent.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
