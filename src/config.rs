//! Cache Configuration
//!
//! Configuration is a plain struct with public fields: create it with the
//! fields you want and hand it to
//! [`LoadingCache::init`](crate::LoadingCache::init). There are no builder
//! methods; all parameters are visible at the construction site.
//!
//! # Example
//!
//! ```
//! use compute_cache::CacheConfig;
//! use core::num::NonZeroUsize;
//!
//! // Bounded cache, 8 segments, statistics enabled.
//! let config = CacheConfig {
//!     capacity: NonZeroUsize::new(10_000),
//!     segments: 8,
//!     record_stats: true,
//! };
//! assert_eq!(config.segment_count(), 8);
//! ```

use core::num::NonZeroUsize;

/// Default number of segments.
///
/// Sixteen segments give good parallelism on common hardware while keeping
/// the per-segment lock and counter overhead small.
pub const DEFAULT_SEGMENT_COUNT: usize = 16;

/// Configuration for a [`LoadingCache`](crate::LoadingCache).
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    /// Total entry capacity across all segments, or `None` for an unbounded
    /// cache that never evicts.
    ///
    /// The capacity is divided evenly across segments, with a minimum of one
    /// entry per segment, so the effective total may differ slightly from
    /// the requested value.
    pub capacity: Option<NonZeroUsize>,

    /// Number of independently locked key partitions. Values below 1 are
    /// treated as 1. More segments mean less lock contention but more
    /// per-segment overhead.
    pub segments: usize,

    /// Whether to accumulate hit/miss/load/eviction statistics.
    ///
    /// When `false`, segments use a no-op counter and
    /// [`LoadingCache::stats`](crate::LoadingCache::stats) reports all
    /// zeros.
    pub record_stats: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            capacity: None,
            segments: DEFAULT_SEGMENT_COUNT,
            record_stats: true,
        }
    }
}

impl CacheConfig {
    /// Returns the effective segment count (at least 1).
    pub fn segment_count(&self) -> usize {
        self.segments.max(1)
    }

    /// Returns the per-segment entry capacity: the total capacity divided by
    /// the segment count, with a minimum of one entry per segment. `None`
    /// when the cache is unbounded.
    pub fn segment_capacity(&self) -> Option<NonZeroUsize> {
        let total = self.capacity?;
        let per_segment = (total.get() / self.segment_count()).max(1);
        NonZeroUsize::new(per_segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.segment_count(), DEFAULT_SEGMENT_COUNT);
        assert!(config.capacity.is_none());
        assert!(config.segment_capacity().is_none());
        assert!(config.record_stats);
    }

    #[test]
    fn test_capacity_split_across_segments() {
        let config = CacheConfig {
            capacity: NonZeroUsize::new(100),
            segments: 16,
            record_stats: true,
        };
        assert_eq!(config.segment_capacity().map(NonZeroUsize::get), Some(6));
    }

    #[test]
    fn test_capacity_never_below_one_per_segment() {
        let config = CacheConfig {
            capacity: NonZeroUsize::new(4),
            segments: 16,
            record_stats: true,
        };
        assert_eq!(config.segment_capacity().map(NonZeroUsize::get), Some(1));
    }

    #[test]
    fn test_zero_segments_clamped() {
        let config = CacheConfig {
            capacity: NonZeroUsize::new(8),
            segments: 0,
            record_stats: false,
        };
        assert_eq!(config.segment_count(), 1);
        assert_eq!(config.segment_capacity().map(NonZeroUsize::get), Some(8));
    }
}
