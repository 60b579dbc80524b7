//! Read-Only Map View
//!
//! [`ReadOnlyMap`] adapts a cache into a map-like surface for iteration and
//! inspection. Reads forward to the cache's loaded entries without
//! triggering loads or touching statistics. Mutating operations exist on
//! the surface but **always** fail with [`ReadOnlyError`] and have no side
//! effect: a computing cache is populated only by `get`/`get_checked` and
//! purged only by `invalidate`.
//!
//! Iteration visits segments in index order and each segment's entries in
//! insertion order; callers should treat the order as unspecified. Snapshots
//! lock one segment at a time, so concurrent mutation may be partially
//! reflected.

use crate::error::ReadOnlyError;
use crate::map::ComputingMap;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};

/// A read-only, map-like view over a cache's loaded entries.
///
/// Borrowed from [`LoadingCache::as_map`](crate::LoadingCache::as_map); the
/// view is live, not a snapshot — each read consults the current cache
/// contents.
pub struct ReadOnlyMap<'a, K, V, E, S> {
    map: &'a ComputingMap<K, V, E, S>,
}

impl<'a, K, V, E, S> ReadOnlyMap<'a, K, V, E, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    pub(crate) fn new(map: &'a ComputingMap<K, V, E, S>) -> Self {
        ReadOnlyMap { map }
    }

    /// Returns the loaded value for `key`, if any.
    ///
    /// Never triggers a load and records neither a hit nor a miss; an
    /// in-flight computation for the key is invisible here.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.peek(key)
    }

    /// Returns `true` if `key` has a loaded value.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.contains(key)
    }

    /// Number of loaded entries; best-effort under concurrent mutation.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no entries are loaded.
    pub fn is_empty(&self) -> bool {
        self.map.len() == 0
    }

    /// Clones the loaded keys. Order is unspecified.
    pub fn keys(&self) -> Vec<K> {
        self.map.keys()
    }

    /// Clones the loaded entries. Order is unspecified.
    pub fn entries(&self) -> Vec<(K, V)> {
        self.map.entries()
    }

    /// Always fails: values can only enter the cache through a load.
    ///
    /// # Errors
    ///
    /// [`ReadOnlyError`], unconditionally; the cache is not modified.
    pub fn insert(&self, _key: K, _value: V) -> Result<Option<V>, ReadOnlyError> {
        Err(ReadOnlyError)
    }

    /// Always fails: values can only enter the cache through a load.
    ///
    /// # Errors
    ///
    /// [`ReadOnlyError`], unconditionally; the cache is not modified.
    pub fn insert_if_absent(&self, _key: K, _value: V) -> Result<Option<V>, ReadOnlyError> {
        Err(ReadOnlyError)
    }

    /// Always fails: loaded values are replaced only by a new load after
    /// invalidation.
    ///
    /// # Errors
    ///
    /// [`ReadOnlyError`], unconditionally; the cache is not modified.
    pub fn replace(&self, _key: &K, _value: V) -> Result<Option<V>, ReadOnlyError> {
        Err(ReadOnlyError)
    }

    /// Always fails: bulk insertion is rejected before consuming any entry.
    ///
    /// # Errors
    ///
    /// [`ReadOnlyError`], unconditionally; the cache is not modified.
    pub fn extend<I>(&self, _entries: I) -> Result<(), ReadOnlyError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Err(ReadOnlyError)
    }
}

impl<K, V, E, S> core::fmt::Debug for ReadOnlyMap<'_, K, V, E, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ReadOnlyMap")
            .field("len", &self.len())
            .finish()
    }
}
