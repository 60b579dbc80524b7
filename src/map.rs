//! Segment Routing
//!
//! [`ComputingMap`] is the pure routing layer between the cache facade and
//! its segments: it hashes a key, picks the owning segment with
//! `hash(key) % segment_count`, and delegates. It has no state of its own
//! beyond the segment slice and the hash builder, and it exposes the
//! segments so the facade can aggregate sizes and statistics.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         ComputingMap                             │
//! │                                                                  │
//! │  hash(key) % N  ──▶  Segment Selection                           │
//! │                                                                  │
//! │  ┌─────────────┐ ┌─────────────┐       ┌─────────────┐           │
//! │  │  Segment 0  │ │  Segment 1  │  ...  │ Segment N-1 │           │
//! │  │ Mutex+Stats │ │ Mutex+Stats │       │ Mutex+Stats │           │
//! │  └─────────────┘ └─────────────┘       └─────────────┘           │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Aggregating operations (`len`, `entries`, `stats`) visit the segments
//! sequentially, locking one at a time, so their results are best-effort
//! under concurrent mutation rather than a consistent point-in-time view.

use crate::config::CacheConfig;
use crate::error::LoadError;
use crate::loader::CacheLoader;
use crate::segment::Segment;
use crate::stats::CacheStats;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};

/// Routes each key to its owning [`Segment`] and delegates.
pub(crate) struct ComputingMap<K, V, E, S> {
    segments: Box<[Segment<K, V, E, S>]>,
    hash_builder: S,
}

impl<K, V, E, S> ComputingMap<K, V, E, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    /// Builds the segment arena from a configuration, cloning the hash
    /// builder into each segment.
    pub(crate) fn with_hasher(config: &CacheConfig, hash_builder: S) -> Self {
        let segment_capacity = config.segment_capacity();
        let segments: Vec<_> = (0..config.segment_count())
            .map(|_| Segment::with_hasher(segment_capacity, hash_builder.clone(), config.record_stats))
            .collect();
        ComputingMap {
            segments: segments.into_boxed_slice(),
            hash_builder,
        }
    }

    /// Returns the index of the segment owning `key`.
    #[inline]
    fn segment_index<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        (self.hash_builder.hash_one(key) as usize) % self.segments.len()
    }

    /// Returns the segment owning `key`.
    #[inline]
    fn segment_for<Q>(&self, key: &Q) -> &Segment<K, V, E, S>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        &self.segments[self.segment_index(key)]
    }

    /// Routes `compute` to the owning segment.
    pub(crate) fn compute<L>(&self, key: &K, loader: &L) -> Result<V, LoadError<E>>
    where
        L: CacheLoader<K, V, Error = E>,
    {
        self.segment_for(key).compute(key, loader)
    }

    /// Returns the loaded value for `key` without triggering a load.
    pub(crate) fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment_for(key).peek(key)
    }

    /// Returns `true` if `key` has a loaded value.
    pub(crate) fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment_for(key).contains(key)
    }

    /// Removes the loaded entry for `key` from its owning segment.
    pub(crate) fn invalidate<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment_for(key).invalidate(key)
    }

    /// Sum of loaded entries across all segments, one lock at a time.
    pub(crate) fn len(&self) -> usize {
        self.segments.iter().map(Segment::len).sum()
    }

    /// Loaded entries across all segments: segment index order, then
    /// per-segment insertion order.
    pub(crate) fn entries(&self) -> Vec<(K, V)> {
        self.segments.iter().flat_map(Segment::entries).collect()
    }

    /// Loaded keys across all segments, in the same order as
    /// [`entries`](Self::entries).
    pub(crate) fn keys(&self) -> Vec<K> {
        self.segments.iter().flat_map(Segment::keys).collect()
    }

    /// Saturating sum of every segment's statistics snapshot.
    ///
    /// Each segment's counters are snapshotted as a unit; the sum across
    /// segments may partially reflect concurrent activity.
    pub(crate) fn stats(&self) -> CacheStats {
        self.segments
            .iter()
            .map(Segment::stats_snapshot)
            .fold(CacheStats::default(), |acc, s| acc.saturating_add(&s))
    }

    /// Number of segments in the arena.
    pub(crate) fn segment_count(&self) -> usize {
        self.segments.len()
    }
}
