//! Cache Statistics System
//!
//! Provides the statistics accumulation and snapshot machinery for the cache.
//! Each segment owns one [`StatsCounter`], mutated only by threads operating
//! within that segment, and the cache facade sums all segment snapshots into
//! a single [`CacheStats`] value on demand.
//!
//! # Why a trait?
//!
//! The counter is a seam: the default [`SimpleStatsCounter`] uses plain atomic
//! counters, [`DisabledStatsCounter`] turns accounting into a no-op for
//! workloads that do not want the (small) overhead, and downstream crates can
//! plug in their own instrumentation.
//!
//! # Snapshot semantics
//!
//! [`StatsCounter::snapshot`] may race with concurrent record calls and is
//! **not** atomic across the individual counters: a hit recorded while a
//! snapshot is being taken may or may not be reflected. Callers must tolerate
//! such torn reads; the counters themselves are individually monotonic.

use core::sync::atomic::{AtomicU64, Ordering};
use core::time::Duration;

/// An immutable, point-in-time copy of accumulated cache statistics.
///
/// Produced by [`StatsCounter::snapshot`] for a single segment, or by
/// [`LoadingCache::stats`](crate::LoadingCache::stats) as the saturating sum
/// across all segments. All counts are non-negative and all derived rates are
/// clamped to `0.0` when their denominator is zero, so they are never `NaN`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of `get` calls that found an already-loaded value.
    pub hit_count: u64,

    /// Number of `get` calls that did not find a loaded value.
    ///
    /// Recorded once per requesting thread, so concurrent callers racing on
    /// the same absent key each contribute a miss even though only one of
    /// them runs the loader.
    pub miss_count: u64,

    /// Number of loading episodes that completed successfully.
    pub load_success_count: u64,

    /// Total wall-clock nanoseconds spent in successful loader invocations.
    pub total_load_time_nanos: u64,

    /// Number of entries removed by capacity pressure.
    ///
    /// Explicit invalidation is not an eviction and is not counted here.
    pub eviction_count: u64,
}

impl CacheStats {
    /// Returns the total number of lookups recorded (`hits + misses`),
    /// saturating on overflow.
    pub fn request_count(&self) -> u64 {
        self.hit_count.saturating_add(self.miss_count)
    }

    /// Returns the fraction of lookups that were hits, or `0.0` if no
    /// lookups have been recorded.
    pub fn hit_rate(&self) -> f64 {
        let requests = self.request_count();
        if requests == 0 {
            0.0
        } else {
            self.hit_count as f64 / requests as f64
        }
    }

    /// Returns the fraction of lookups that were misses, or `0.0` if no
    /// lookups have been recorded.
    pub fn miss_rate(&self) -> f64 {
        let requests = self.request_count();
        if requests == 0 {
            0.0
        } else {
            self.miss_count as f64 / requests as f64
        }
    }

    /// Returns the average nanoseconds spent per successful load, or `0.0`
    /// if no load has succeeded yet.
    pub fn average_load_penalty_nanos(&self) -> f64 {
        if self.load_success_count == 0 {
            0.0
        } else {
            self.total_load_time_nanos as f64 / self.load_success_count as f64
        }
    }

    /// Returns the sum of `self` and `other`, saturating each counter on
    /// overflow. Used to aggregate per-segment snapshots.
    pub fn saturating_add(&self, other: &CacheStats) -> CacheStats {
        CacheStats {
            hit_count: self.hit_count.saturating_add(other.hit_count),
            miss_count: self.miss_count.saturating_add(other.miss_count),
            load_success_count: self.load_success_count.saturating_add(other.load_success_count),
            total_load_time_nanos: self
                .total_load_time_nanos
                .saturating_add(other.total_load_time_nanos),
            eviction_count: self.eviction_count.saturating_add(other.eviction_count),
        }
    }
}

/// Accumulator of cache events, one per segment.
///
/// Implementations must be safe to call from multiple threads; all record
/// methods take `&self`. Which method is called, and how often, is dictated
/// by the cache:
///
/// - [`record_hit`](Self::record_hit): once per lookup that observed an
///   already-loaded value.
/// - [`record_miss`](Self::record_miss): once per lookup that did not,
///   including callers that then waited on another thread's in-flight load.
/// - [`record_load_success`](Self::record_load_success): exactly once per
///   successful loading episode, by the thread that ran the loader. Never
///   called for a failed load or by a thread that merely waited.
/// - [`record_eviction`](Self::record_eviction): once per entry removed by
///   capacity pressure. Never called for explicit invalidation.
pub trait StatsCounter: Send + Sync {
    /// Records a lookup that found an already-loaded value.
    fn record_hit(&self);

    /// Records a lookup that did not find a loaded value.
    fn record_miss(&self);

    /// Records one successful loading episode and the wall-clock time the
    /// loader took.
    fn record_load_success(&self, load_time: Duration);

    /// Records the removal of one entry under capacity pressure.
    fn record_eviction(&self);

    /// Returns a copy of the current counter values.
    ///
    /// May race with concurrent record calls; see the module docs for the
    /// torn-read caveat.
    fn snapshot(&self) -> CacheStats;
}

/// The default [`StatsCounter`]: four independent atomic counters plus the
/// accumulated load time.
///
/// Increments use relaxed ordering; the counters are statistical and carry no
/// synchronization obligations of their own.
#[derive(Debug, Default)]
pub struct SimpleStatsCounter {
    hit_count: AtomicU64,
    miss_count: AtomicU64,
    load_success_count: AtomicU64,
    total_load_time_nanos: AtomicU64,
    eviction_count: AtomicU64,
}

impl SimpleStatsCounter {
    /// Creates a counter with all values at zero.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatsCounter for SimpleStatsCounter {
    fn record_hit(&self) {
        self.hit_count.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.miss_count.fetch_add(1, Ordering::Relaxed);
    }

    fn record_load_success(&self, load_time: Duration) {
        self.load_success_count.fetch_add(1, Ordering::Relaxed);
        let nanos = u64::try_from(load_time.as_nanos()).unwrap_or(u64::MAX);
        self.total_load_time_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    fn record_eviction(&self) {
        self.eviction_count.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            load_success_count: self.load_success_count.load(Ordering::Relaxed),
            total_load_time_nanos: self.total_load_time_nanos.load(Ordering::Relaxed),
            eviction_count: self.eviction_count.load(Ordering::Relaxed),
        }
    }
}

/// A [`StatsCounter`] that discards every event.
///
/// Selected by [`CacheConfig::record_stats`](crate::CacheConfig) = `false`;
/// its snapshot is always all zeros.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledStatsCounter;

impl StatsCounter for DisabledStatsCounter {
    fn record_hit(&self) {}

    fn record_miss(&self) {}

    fn record_load_success(&self, _load_time: Duration) {}

    fn record_eviction(&self) {}

    fn snapshot(&self) -> CacheStats {
        CacheStats::default()
    }
}
