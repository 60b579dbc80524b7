//! Loading Cache Facade
//!
//! [`LoadingCache`] is the public surface of the crate: a thread-safe
//! key/value cache that computes missing values on demand through a
//! construction-time [`CacheLoader`], guaranteeing at most one concurrent
//! computation per key and accumulating statistics that can be snapshotted
//! while the cache is in use.
//!
//! # Example
//!
//! ```
//! use compute_cache::{CacheConfig, LoadingCache};
//! use std::convert::Infallible;
//!
//! let cache = LoadingCache::init(
//!     CacheConfig::default(),
//!     |key: &String| Ok::<_, Infallible>(key.len()),
//!     None,
//! );
//!
//! assert_eq!(cache.get(&"hello".to_string()).unwrap(), 5); // computed
//! assert_eq!(cache.get(&"hello".to_string()).unwrap(), 5); // cached
//!
//! let stats = cache.stats();
//! assert_eq!(stats.miss_count, 1);
//! assert_eq!(stats.hit_count, 1);
//! assert_eq!(stats.load_success_count, 1);
//! ```
//!
//! # Failure surfaces
//!
//! [`get`](LoadingCache::get) and [`get_checked`](LoadingCache::get_checked)
//! have identical caching semantics and differ only in how a loader failure
//! reaches the caller: `get` type-erases the cause into a
//! [`ComputeError`], `get_checked` preserves the loader's error type in a
//! [`LoadError`]. Neither ever fails for a cache-internal reason.

use crate::config::CacheConfig;
use crate::error::{ComputeError, LoadError};
use crate::loader::CacheLoader;
use crate::map::ComputingMap;
use crate::stats::CacheStats;
use crate::view::ReadOnlyMap;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// A segmented, thread-safe computing cache.
///
/// Keys are partitioned across independently locked segments by hash; each
/// segment coordinates loads per key so that N concurrent lookups of an
/// absent key run the loader exactly once and all observe the same outcome.
///
/// # Type Parameters
///
/// - `K`: key type; `Hash + Eq + Clone`.
/// - `V`: value type; `Clone` (lookups return clones so no lock is held
///   while the caller uses the value).
/// - `L`: the [`CacheLoader`] invoked for missing keys.
/// - `S`: hash builder, shared between segment routing and the per-segment
///   maps. Defaults to `DefaultHashBuilder`.
///
/// The cache is `Send + Sync` (given `Send` key/value/loader types) and is
/// typically shared across threads via `Arc`.
pub struct LoadingCache<K, V, L, S = DefaultHashBuilder>
where
    L: CacheLoader<K, V>,
{
    map: ComputingMap<K, V, L::Error, S>,
    loader: L,
    config: CacheConfig,
}

impl<K, V, L> LoadingCache<K, V, L, DefaultHashBuilder>
where
    K: Hash + Eq + Clone,
    V: Clone,
    L: CacheLoader<K, V>,
{
    /// Creates a cache from a configuration and a loader, with an optional
    /// hash builder.
    ///
    /// This is the recommended constructor. Pass `None` for the default
    /// hasher, or a specific builder for deterministic hashing.
    ///
    /// # Example
    ///
    /// ```
    /// use compute_cache::{CacheConfig, LoadingCache};
    /// use core::num::NonZeroUsize;
    /// use std::convert::Infallible;
    ///
    /// let config = CacheConfig {
    ///     capacity: NonZeroUsize::new(1_000),
    ///     segments: 8,
    ///     record_stats: true,
    /// };
    /// let cache = LoadingCache::init(
    ///     config,
    ///     |key: &u32| Ok::<_, Infallible>(key * 2),
    ///     None,
    /// );
    /// assert_eq!(cache.get(&21).unwrap(), 42);
    /// ```
    pub fn init(config: CacheConfig, loader: L, hasher: Option<DefaultHashBuilder>) -> Self {
        Self::init_with_hasher(config, loader, hasher.unwrap_or_default())
    }
}

impl<K, V, L, S> LoadingCache<K, V, L, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    L: CacheLoader<K, V>,
    S: BuildHasher + Clone,
{
    /// Creates a cache with a custom hash builder, which is cloned into
    /// each segment.
    pub fn init_with_hasher(config: CacheConfig, loader: L, hash_builder: S) -> Self {
        LoadingCache {
            map: ComputingMap::with_hasher(&config, hash_builder),
            loader,
            config,
        }
    }

    /// Returns the value for `key`, computing it with the loader if absent.
    ///
    /// If another thread is already computing this key, the call blocks
    /// until that computation finishes and returns its outcome; the loader
    /// is not invoked a second time. There is no timeout: a stuck loader
    /// stalls every requester of its key.
    ///
    /// # Errors
    ///
    /// A loader failure is surfaced as a [`ComputeError`] carrying the
    /// original cause, type-erased. Failures are never cached; a later call
    /// retries the loader.
    pub fn get(&self, key: &K) -> Result<V, ComputeError> {
        self.map
            .compute(key, &self.loader)
            .map_err(ComputeError::from)
    }

    /// Same caching semantics as [`get`](Self::get), but preserves the
    /// loader's error type.
    ///
    /// # Errors
    ///
    /// [`LoadError::Direct`] when this caller's own loading episode failed,
    /// [`LoadError::Async`] when a failure was observed while waiting on
    /// another thread's episode. Both carry the same shared cause.
    pub fn get_checked(&self, key: &K) -> Result<V, LoadError<L::Error>> {
        self.map.compute(key, &self.loader)
    }

    /// Removes the loaded entry for `key`. Returns whether one was removed.
    ///
    /// A no-op for absent keys. Never recorded as an eviction. An in-flight
    /// computation for the key is unaffected: it still completes and
    /// publishes its result to its waiters.
    pub fn invalidate<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.invalidate(key)
    }

    /// Number of loaded entries.
    ///
    /// Segments are counted one at a time, so under concurrent mutation the
    /// total is best-effort rather than a consistent point-in-time count.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no entries are loaded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a read-only map view over the loaded entries.
    ///
    /// Reads forward to the cache without triggering loads; every mutating
    /// operation on the view fails with
    /// [`ReadOnlyError`](crate::ReadOnlyError).
    pub fn as_map(&self) -> ReadOnlyMap<'_, K, V, L::Error, S> {
        ReadOnlyMap::new(&self.map)
    }

    /// Sums every segment's statistics counters into a fresh snapshot.
    ///
    /// Each segment's counters are read as a unit, but the sum across
    /// segments is not atomic: concurrent activity during aggregation may
    /// be partially reflected.
    pub fn stats(&self) -> CacheStats {
        self.map.stats()
    }

    /// Number of key partitions.
    pub fn segment_count(&self) -> usize {
        self.map.segment_count()
    }

    /// The configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

impl<K, V, L, S> core::fmt::Debug for LoadingCache<K, V, L, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    L: CacheLoader<K, V>,
    S: BuildHasher + Clone,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoadingCache")
            .field("segment_count", &self.segment_count())
            .field("len", &self.len())
            .finish()
    }
}
