//! Cache Segment
//!
//! A [`Segment`] is one independently locked partition of the cache's key
//! space. It owns the slot map for its keys, the insertion-order queue used
//! for capacity eviction, and its own [`StatsCounter`]; no state is shared
//! between segments, so there is no lock ordering between them.
//!
//! # Per-key load coordination
//!
//! Each key cycles through an explicit state machine, stored as the slot for
//! that key:
//!
//! ```text
//!              ┌─────────────────────────────────────┐
//!              ▼                                     │ load failed /
//!          ABSENT ──── claim episode ────▶ LOADING ──┤ invalidated later
//!          (no slot)                    (LoadHandle) │
//!              ▲                                     │ load succeeded
//!              │                                     ▼
//!              └──── invalidate / evict ────────  LOADED
//! ```
//!
//! The first thread to miss on a key installs a [`LoadHandle`] and becomes
//! the *computing thread* for that loading episode; it runs the loader with
//! the segment lock **released**. Threads that miss while the handle is in
//! place clone it, release the lock, and block on its condvar until the
//! computing thread publishes the outcome. Exactly one loader invocation
//! happens per episode, and every requester observes that single outcome.
//!
//! The segment lock is only ever held for map bookkeeping, never across a
//! loader call or a wait, so a slow loader stalls only the requesters of its
//! own key.
//!
//! # Eviction
//!
//! Bounded segments keep loaded keys in arrival order and drop the oldest
//! loaded entry when a fresh load would exceed the segment's share of the
//! capacity. Eviction is the only path that records
//! [`record_eviction`](StatsCounter::record_eviction); explicit
//! [`invalidate`](Segment::invalidate) never does.

use crate::error::LoadError;
use crate::loader::CacheLoader;
use crate::stats::{CacheStats, DisabledStatsCounter, SimpleStatsCounter, StatsCounter};
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;
use log::{debug, trace};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// Shared rendezvous between the computing thread of a loading episode and
/// its waiters.
///
/// The computing thread publishes exactly once; waiters block on the condvar
/// until the outcome is present. The failure side is an `Arc` so the same
/// cause instance reaches every waiter.
struct LoadHandle<V, E> {
    outcome: Mutex<Option<Result<V, Arc<E>>>>,
    ready: Condvar,
}

impl<V, E> LoadHandle<V, E> {
    fn new() -> Self {
        LoadHandle {
            outcome: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    /// Blocks until the episode's outcome is published, then returns a copy
    /// of it.
    fn wait(&self) -> Result<V, Arc<E>>
    where
        V: Clone,
    {
        let mut outcome = self.outcome.lock();
        loop {
            match outcome.as_ref() {
                Some(Ok(value)) => return Ok(value.clone()),
                Some(Err(cause)) => return Err(Arc::clone(cause)),
                None => self.ready.wait(&mut outcome),
            }
        }
    }

    /// Publishes the episode's outcome and wakes every waiter.
    fn publish(&self, result: Result<V, Arc<E>>) {
        let mut outcome = self.outcome.lock();
        *outcome = Some(result);
        self.ready.notify_all();
    }
}

/// Per-key slot: either a loaded value or an in-flight loading episode.
///
/// An absent map entry is the ABSENT state.
enum Slot<V, E> {
    Loaded(V),
    Loading(Arc<LoadHandle<V, E>>),
}

/// What a lookup decided to do, resolved under the segment lock and acted on
/// after releasing it.
enum Claim<V, E> {
    Hit(V),
    Wait(Arc<LoadHandle<V, E>>),
    Load(Arc<LoadHandle<V, E>>),
}

/// Lock-protected interior of a segment: the slot map plus the
/// insertion-order queue of loaded keys.
///
/// Invariant: a key is in `order` if and only if its slot is `Loaded`, so
/// `order.len()` is the loaded-entry count.
struct SegmentCore<K, V, E, S> {
    slots: HashMap<K, Slot<V, E>, S>,
    order: VecDeque<K>,
}

impl<K, V, E, S> SegmentCore<K, V, E, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    /// Stores a freshly loaded value, evicting the oldest loaded entry if
    /// the segment is over capacity. Returns the evicted key, if any.
    fn store_loaded(&mut self, key: &K, value: V, capacity: Option<NonZeroUsize>) -> Option<K> {
        let prior = self.slots.insert(key.clone(), Slot::Loaded(value));
        if !matches!(prior, Some(Slot::Loaded(_))) {
            self.order.push_back(key.clone());
        }

        let capacity = capacity?;
        if self.order.len() > capacity.get() {
            // At least two loaded keys here, so the front is never the key
            // that was just stored.
            if let Some(victim) = self.order.pop_front() {
                self.slots.remove(&victim);
                return Some(victim);
            }
        }
        None
    }

    /// Removes the loading slot for `key`, but only if it still belongs to
    /// this episode's handle. A failed episode must not clobber a successor
    /// that already claimed the key.
    fn clear_loading(&mut self, key: &K, handle: &Arc<LoadHandle<V, E>>) {
        if let Some(Slot::Loading(current)) = self.slots.get(key) {
            if Arc::ptr_eq(current, handle) {
                self.slots.remove(key);
            }
        }
    }

    fn remove_loaded<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if !matches!(self.slots.get(key), Some(Slot::Loaded(_))) {
            return false;
        }
        self.slots.remove(key);
        if let Some(idx) = self.order.iter().position(|k| k.borrow() == key) {
            self.order.remove(idx);
        }
        true
    }
}

/// One independently locked partition of the cache.
///
/// Owns a disjoint subset of keys, the statistics counter for events
/// observed on those keys, and the per-key load coordination machinery.
pub(crate) struct Segment<K, V, E, S> {
    core: Mutex<SegmentCore<K, V, E, S>>,
    stats: Box<dyn StatsCounter>,
    capacity: Option<NonZeroUsize>,
}

impl<K, V, E, S> Segment<K, V, E, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
    /// Creates an empty segment with its own hasher, capacity share, and
    /// statistics counter.
    pub(crate) fn with_hasher(
        capacity: Option<NonZeroUsize>,
        hash_builder: S,
        record_stats: bool,
    ) -> Self {
        let stats: Box<dyn StatsCounter> = if record_stats {
            Box::new(SimpleStatsCounter::new())
        } else {
            Box::new(DisabledStatsCounter)
        };
        let map_capacity = capacity.map_or(0, NonZeroUsize::get);
        Segment {
            core: Mutex::new(SegmentCore {
                slots: HashMap::with_capacity_and_hasher(map_capacity, hash_builder),
                order: VecDeque::new(),
            }),
            stats,
            capacity,
        }
    }

    /// Returns the cached value for `key`, or runs `loader` for it with
    /// at-most-one-concurrent-computation semantics.
    ///
    /// The caller either observes an already-loaded value (hit), waits on
    /// another thread's in-flight episode, or becomes the computing thread
    /// itself. Statistics are recorded per the [`StatsCounter`] contract:
    /// one miss per requester that did not see a loaded value, one load
    /// success per successful episode.
    pub(crate) fn compute<L>(&self, key: &K, loader: &L) -> Result<V, LoadError<E>>
    where
        L: CacheLoader<K, V, Error = E>,
    {
        let claim = {
            let mut core = self.core.lock();
            match core.slots.get(key) {
                Some(Slot::Loaded(value)) => {
                    self.stats.record_hit();
                    Claim::Hit(value.clone())
                }
                Some(Slot::Loading(handle)) => {
                    self.stats.record_miss();
                    Claim::Wait(Arc::clone(handle))
                }
                None => {
                    self.stats.record_miss();
                    let handle = Arc::new(LoadHandle::new());
                    core.slots
                        .insert(key.clone(), Slot::Loading(Arc::clone(&handle)));
                    Claim::Load(handle)
                }
            }
        };

        match claim {
            Claim::Hit(value) => Ok(value),
            Claim::Wait(handle) => {
                trace!("waiting on in-flight load for key in this segment");
                handle.wait().map_err(LoadError::Async)
            }
            Claim::Load(handle) => self.run_loading_episode(key, loader, handle),
        }
    }

    /// Runs the loader as the computing thread for `key` and publishes the
    /// outcome to every waiter.
    fn run_loading_episode<L>(
        &self,
        key: &K,
        loader: &L,
        handle: Arc<LoadHandle<V, E>>,
    ) -> Result<V, LoadError<E>>
    where
        L: CacheLoader<K, V, Error = E>,
    {
        let started = Instant::now();
        let outcome = loader.load(key);
        let elapsed = started.elapsed();

        match outcome {
            Ok(value) => {
                let evicted = {
                    let mut core = self.core.lock();
                    core.store_loaded(key, value.clone(), self.capacity)
                };
                if evicted.is_some() {
                    self.stats.record_eviction();
                    debug!("evicted oldest entry under capacity pressure");
                }
                self.stats.record_load_success(elapsed);
                debug!("loading episode succeeded in {elapsed:?}");
                handle.publish(Ok(value.clone()));
                Ok(value)
            }
            Err(err) => {
                let cause = Arc::new(err);
                {
                    let mut core = self.core.lock();
                    core.clear_loading(key, &handle);
                }
                debug!("loading episode failed after {elapsed:?}");
                handle.publish(Err(Arc::clone(&cause)));
                Err(LoadError::Direct(cause))
            }
        }
    }

    /// Returns the loaded value for `key` without triggering a load and
    /// without touching statistics or the eviction order.
    pub(crate) fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let core = self.core.lock();
        match core.slots.get(key) {
            Some(Slot::Loaded(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Returns `true` if `key` currently has a loaded value. An in-flight
    /// load does not count.
    pub(crate) fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let core = self.core.lock();
        matches!(core.slots.get(key), Some(Slot::Loaded(_)))
    }

    /// Removes the loaded entry for `key`, if any. Returns whether an entry
    /// was removed.
    ///
    /// An in-flight loading episode for the key is left untouched: it will
    /// still complete and publish its result to its waiters, and a
    /// successful episode will store its value.
    pub(crate) fn invalidate<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let mut core = self.core.lock();
        core.remove_loaded(key)
    }

    /// Number of loaded entries. In-flight loads are not counted.
    pub(crate) fn len(&self) -> usize {
        self.core.lock().order.len()
    }

    /// Clones the loaded entries in insertion order.
    pub(crate) fn entries(&self) -> Vec<(K, V)> {
        let core = self.core.lock();
        core.order
            .iter()
            .filter_map(|key| match core.slots.get(key) {
                Some(Slot::Loaded(value)) => Some((key.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }

    /// Clones the loaded keys in insertion order.
    pub(crate) fn keys(&self) -> Vec<K> {
        self.core.lock().order.iter().cloned().collect()
    }

    /// Snapshot of this segment's statistics counter.
    pub(crate) fn stats_snapshot(&self) -> CacheStats {
        self.stats.snapshot()
    }
}
