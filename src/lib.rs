#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Module Map
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`cache`] | [`LoadingCache`], the public facade |
//! | [`config`] | [`CacheConfig`] construction parameters |
//! | [`loader`] | [`CacheLoader`] trait and the closure blanket impl |
//! | [`stats`] | [`StatsCounter`], [`SimpleStatsCounter`], [`CacheStats`] |
//! | [`error`] | [`ComputeError`], [`LoadError`], [`ReadOnlyError`] |
//! | [`view`] | [`ReadOnlyMap`], the read-only map adapter |
//!
//! ## Choosing a failure surface
//!
//! ```text
//! Does the call site care which error type the loader produces?
//!
//!         No ──▶ get()          -> Result<V, ComputeError>   (cause type-erased)
//!        Yes ──▶ get_checked()  -> Result<V, LoadError<E>>   (cause typed)
//! ```
//!
//! Both surfaces have identical caching semantics; only the error shape
//! differs. A failure observed while waiting on another thread's load is
//! marked asynchronous (`is_asynchronous()`), with the same underlying
//! cause the computing thread saw.
//!
//! ## Statistics at a glance
//!
//! ```
//! use compute_cache::{CacheConfig, LoadingCache};
//! use std::convert::Infallible;
//!
//! let cache = LoadingCache::init(
//!     CacheConfig::default(),
//!     |key: &u64| Ok::<_, Infallible>(key * 3),
//!     None,
//! );
//!
//! cache.get(&1).unwrap(); // miss + load
//! cache.get(&1).unwrap(); // hit
//! cache.get(&2).unwrap(); // miss + load
//!
//! let stats = cache.stats();
//! assert_eq!(stats.request_count(), 3);
//! assert_eq!(stats.hit_count, 1);
//! assert_eq!(stats.miss_count, 2);
//! assert_eq!(stats.load_success_count, 2);
//! assert!(stats.hit_rate() > 0.3 && stats.hit_rate() < 0.4);
//! ```
//!
//! ## Logging
//!
//! The crate emits `log` records on the loading path: `debug` on episode
//! completion (with elapsed time), failure, and eviction; `trace` when a
//! thread parks behind another thread's in-flight load. Wire up any
//! `log`-compatible backend to observe them.

/// Loading cache facade.
///
/// Provides [`LoadingCache`], the public entry point: construction from a
/// [`CacheConfig`] and a [`CacheLoader`], the `get`/`get_checked` lookup
/// surfaces, invalidation, the read-only map view, and stats aggregation.
pub mod cache;

/// Cache configuration.
///
/// Provides [`CacheConfig`], a plain public-field struct covering capacity,
/// segment count, and statistics recording.
pub mod config;

/// Error types.
///
/// Provides the dual checked/unchecked loader-failure surfaces and the
/// read-only view rejection error.
pub mod error;

/// The loader contract.
///
/// Provides [`CacheLoader`] and its blanket implementation for closures.
pub mod loader;

/// Cache statistics.
///
/// Provides the [`StatsCounter`] accumulator seam, its atomic and no-op
/// implementations, and the [`CacheStats`] snapshot value.
pub mod stats;

/// Read-only map view.
///
/// Provides [`ReadOnlyMap`], the map adapter over a cache that forwards
/// reads and deterministically rejects direct mutation.
pub mod view;

/// Segment routing layer.
///
/// Hashes each key to exactly one segment and delegates; internal
/// infrastructure shared by the facade and the view.
mod map;

/// Independently locked key partition with per-key load coordination.
///
/// Internal infrastructure; the per-key ABSENT/LOADING/LOADED state machine
/// and the waiter rendezvous live here.
mod segment;

pub use cache::LoadingCache;
pub use config::{CacheConfig, DEFAULT_SEGMENT_COUNT};
pub use error::{ComputeError, LoadError, ReadOnlyError};
pub use loader::CacheLoader;
pub use stats::{CacheStats, DisabledStatsCounter, SimpleStatsCounter, StatsCounter};
pub use view::ReadOnlyMap;
