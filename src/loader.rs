//! Loader Contract
//!
//! A [`CacheLoader`] computes the value for a key that is not yet cached.
//! The cache invokes it at most once per loading episode: however many
//! threads race on an absent key, exactly one of them runs the loader and
//! everyone else waits for that invocation's outcome.
//!
//! Loaders are consumed by reference and may be called concurrently for
//! *different* keys, so implementations must be `Send + Sync` (closures over
//! shared state typically already are).
//!
//! A blanket implementation is provided for plain closures:
//!
//! ```
//! use compute_cache::{CacheConfig, LoadingCache};
//! use std::convert::Infallible;
//!
//! let cache = LoadingCache::init(
//!     CacheConfig::default(),
//!     |key: &String| Ok::<_, Infallible>(key.to_uppercase()),
//!     None,
//! );
//! assert_eq!(cache.get(&"abc".to_string()).unwrap(), "ABC");
//! ```

use std::error::Error as StdError;

/// Computes the value for a missing key.
///
/// The error type is surfaced unmodified through
/// [`LoadError`](crate::LoadError) and type-erased through
/// [`ComputeError`](crate::ComputeError); the cache never retries or
/// swallows a failure.
pub trait CacheLoader<K, V> {
    /// Failure type the loader may produce.
    type Error: StdError + Send + Sync + 'static;

    /// Computes the value for `key`.
    ///
    /// Invoked at most once per loading episode; its wall-clock duration is
    /// measured by the cache and fed into the statistics on success.
    fn load(&self, key: &K) -> Result<V, Self::Error>;
}

impl<K, V, E, F> CacheLoader<K, V> for F
where
    F: Fn(&K) -> Result<V, E>,
    E: StdError + Send + Sync + 'static,
{
    type Error = E;

    fn load(&self, key: &K) -> Result<V, E> {
        self(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[test]
    fn test_closure_loader() {
        let loader = |key: &i32| Ok::<_, Infallible>(key * 2);
        assert_eq!(loader.load(&21), Ok(42));
    }

    #[test]
    fn test_failing_loader() {
        #[derive(Debug, thiserror::Error)]
        #[error("no value for {0}")]
        struct Missing(i32);

        let loader = |key: &i32| -> Result<i32, Missing> { Err(Missing(*key)) };
        let err = loader.load(&7).unwrap_err();
        assert_eq!(err.to_string(), "no value for 7");
    }
}
