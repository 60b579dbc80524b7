//! Cache Error Types
//!
//! All loader-originated failures surface to callers through one of two
//! conventions, converted from a single internal result:
//!
//! - [`LoadError<E>`] preserves the loader's concrete error type. Returned by
//!   [`LoadingCache::get_checked`](crate::LoadingCache::get_checked), it is
//!   the surface for callers that want to match on the loader's own failure.
//! - [`ComputeError`] type-erases the cause behind
//!   `Arc<dyn Error + Send + Sync>`. Returned by
//!   [`LoadingCache::get`](crate::LoadingCache::get), it is the surface for
//!   callers that do not care which loader produced the value.
//!
//! Both distinguish a failure of the caller's *own* loading episode from one
//! observed while waiting on another thread's episode, and both expose the
//! original loader error through [`Error::source`](std::error::Error::source).
//! The cause is shared (`Arc`), so the originating thread and every waiter
//! see the same error instance.
//!
//! [`ReadOnlyError`] is unrelated to loading: it is the deterministic
//! rejection returned by every mutating operation on
//! [`ReadOnlyMap`](crate::ReadOnlyMap).

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A loader failure with the loader's error type preserved.
///
/// The two variants carry the same kind of cause; they differ only in which
/// thread ran the loader. A single failed loading episode produces exactly
/// one `Direct` (for the computing thread) and one `Async` per waiter, all
/// sharing one underlying error value.
pub enum LoadError<E> {
    /// The caller's own loading episode invoked the loader and it failed.
    Direct(Arc<E>),

    /// The caller waited on a loading episode owned by another thread, and
    /// that episode failed.
    Async(Arc<E>),
}

impl<E> LoadError<E> {
    /// Returns the underlying loader error.
    pub fn cause(&self) -> &E {
        match self {
            LoadError::Direct(cause) | LoadError::Async(cause) => cause,
        }
    }

    /// Returns `true` if the failure was observed while waiting on another
    /// thread's loading episode.
    pub fn is_asynchronous(&self) -> bool {
        matches!(self, LoadError::Async(_))
    }

    /// Consumes the error and returns the shared cause.
    pub fn into_cause(self) -> Arc<E> {
        match self {
            LoadError::Direct(cause) | LoadError::Async(cause) => cause,
        }
    }
}

impl<E> Clone for LoadError<E> {
    fn clone(&self) -> Self {
        match self {
            LoadError::Direct(cause) => LoadError::Direct(Arc::clone(cause)),
            LoadError::Async(cause) => LoadError::Async(Arc::clone(cause)),
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for LoadError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Direct(cause) => f.debug_tuple("Direct").field(cause).finish(),
            LoadError::Async(cause) => f.debug_tuple("Async").field(cause).finish(),
        }
    }
}

impl<E: fmt::Display> fmt::Display for LoadError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Direct(_) => write!(f, "value computation failed"),
            LoadError::Async(_) => {
                write!(f, "value computation failed in another thread")
            }
        }
    }
}

impl<E> StdError for LoadError<E>
where
    E: StdError + 'static,
{
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.cause())
    }
}

/// A loader failure with the cause type-erased.
///
/// This is the surface of [`LoadingCache::get`](crate::LoadingCache::get):
/// the caller does not have to name the loader's error type, only that the
/// computation failed. The original error remains reachable through
/// [`Error::source`](std::error::Error::source).
#[derive(Debug, Clone)]
pub struct ComputeError {
    asynchronous: bool,
    source: Arc<dyn StdError + Send + Sync + 'static>,
}

impl ComputeError {
    /// Returns `true` if the failure was observed while waiting on another
    /// thread's loading episode.
    pub fn is_asynchronous(&self) -> bool {
        self.asynchronous
    }
}

impl fmt::Display for ComputeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.asynchronous {
            write!(f, "value computation failed in another thread")
        } else {
            write!(f, "value computation failed")
        }
    }
}

impl StdError for ComputeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref())
    }
}

impl<E> From<LoadError<E>> for ComputeError
where
    E: StdError + Send + Sync + 'static,
{
    fn from(err: LoadError<E>) -> Self {
        let asynchronous = err.is_asynchronous();
        ComputeError {
            asynchronous,
            source: err.into_cause(),
        }
    }
}

/// Rejection returned by every mutating operation on a read-only map view.
///
/// The cache can only be populated through `get`/`get_checked` (which trigger
/// loads) and purged through `invalidate`; direct mutation of the view always
/// fails with this error and has no side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cache map views do not support direct mutation")]
pub struct ReadOnlyError;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error, PartialEq)]
    #[error("backing store unavailable")]
    struct StoreError;

    #[test]
    fn test_load_error_exposes_cause() {
        let cause = Arc::new(StoreError);
        let direct = LoadError::Direct(Arc::clone(&cause));
        let waited = LoadError::Async(cause);

        assert!(!direct.is_asynchronous());
        assert!(waited.is_asynchronous());
        assert_eq!(direct.cause(), &StoreError);
        assert_eq!(waited.cause(), &StoreError);
    }

    #[test]
    fn test_load_error_source_chain() {
        let err = LoadError::Direct(Arc::new(StoreError));
        let source = StdError::source(&err).expect("source");
        assert_eq!(source.to_string(), "backing store unavailable");
    }

    #[test]
    fn test_clone_shares_cause() {
        let err = LoadError::Async(Arc::new(StoreError));
        let other = err.clone();
        assert!(Arc::ptr_eq(
            &err.into_cause(),
            &other.into_cause()
        ));
    }

    #[test]
    fn test_compute_error_preserves_cause_and_kind() {
        let direct: ComputeError = LoadError::Direct(Arc::new(StoreError)).into();
        let waited: ComputeError = LoadError::Async(Arc::new(StoreError)).into();

        assert!(!direct.is_asynchronous());
        assert!(waited.is_asynchronous());
        assert_eq!(
            StdError::source(&direct).expect("source").to_string(),
            "backing store unavailable"
        );
        assert_ne!(direct.to_string(), waited.to_string());
    }

    #[test]
    fn test_read_only_error_display() {
        assert_eq!(
            ReadOnlyError.to_string(),
            "cache map views do not support direct mutation"
        );
    }
}
