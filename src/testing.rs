//! Test doubles and assertion helpers for code built on cachelite.
//!
//! - [`MemoryCache`]: a thread-safe in-memory provider implementing
//!   [`RemoveByPattern`], for exercising eviction logic without a real store
//! - [`FlakyOperation`]: an operation that fails a scripted number of times
//!   before succeeding, for exercising retry loops
//! - [`assert_timed_out!`](crate::assert_timed_out) and
//!   [`assert_retried!`](crate::assert_retried) assertion macros
//!
//! # Examples
//!
//! ```rust
//! use cachelite::cache::RemoveByPattern;
//! use cachelite::testing::MemoryCache;
//!
//! let cache = MemoryCache::from_iter([("user:1", "ada"), ("user:2", "bob"), ("order:1", "x")]);
//! assert_eq!(cache.remove_by_pattern("user:*").unwrap(), 2);
//! assert_eq!(cache.keys(), vec!["order:1".to_string()]);
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::cache::{CacheError, KeyMatcher, RemoveByPattern};

/// In-memory string cache implementing [`RemoveByPattern`].
///
/// All methods take `&self`; the map sits behind an `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry, returning the previous value.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into())
    }

    /// Look up an entry.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Remove a single entry, returning its value.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    /// True if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove_matching(&self, matcher: &KeyMatcher) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|key, _| !matcher.is_match(key));
        let removed = before - entries.len();
        #[cfg(feature = "tracing")]
        tracing::debug!(pattern = matcher.as_str(), removed, "removed matching keys");
        removed
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryCache {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }
}

impl RemoveByPattern for MemoryCache {
    fn remove_by_pattern(&self, pattern: &str) -> Result<usize, CacheError> {
        let matcher = KeyMatcher::glob(pattern)?;
        Ok(self.remove_matching(&matcher))
    }

    /// Unanchored: `order` removes `archived:order:1`.
    fn remove_by_regex(&self, regex: &str) -> Result<usize, CacheError> {
        let matcher = KeyMatcher::regex(regex)?;
        Ok(self.remove_matching(&matcher))
    }
}

/// An operation that fails a fixed number of times, then succeeds.
///
/// Calls are counted atomically, so the operation can be shared by reference
/// with a retry loop and inspected afterwards.
///
/// # Examples
///
/// ```rust
/// use cachelite::retry::retry_on_error_n;
/// use cachelite::testing::FlakyOperation;
///
/// let flaky = FlakyOperation::new(2, "timeout");
/// assert_eq!(retry_on_error_n(|| flaky.call(), 5), Ok(Some(3)));
/// assert_eq!(flaky.calls(), 3);
/// ```
#[derive(Debug)]
pub struct FlakyOperation<E> {
    failures: u32,
    error: E,
    calls: AtomicU32,
}

impl<E: Clone> FlakyOperation<E> {
    /// Fail the first `failures` calls with `error`, then succeed.
    pub fn new(failures: u32, error: E) -> Self {
        Self {
            failures,
            error,
            calls: AtomicU32::new(0),
        }
    }

    /// Fail every call with `error`.
    pub fn always_failing(error: E) -> Self {
        Self::new(u32::MAX, error)
    }

    /// Run once. Returns the 1-indexed call number on success.
    pub fn call(&self) -> Result<u32, E> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        if n > self.failures {
            Ok(n)
        } else {
            Err(self.error.clone())
        }
    }

    /// Run once, reporting success as a boolean.
    pub fn poll(&self) -> bool {
        self.call().is_ok()
    }

    /// How many times the operation has run.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Assert that a retry result is a timeout.
///
/// Accepts either a `Result<_, TimeoutError<_>>` or a
/// `Result<_, RetryError<_>>`.
///
/// # Example
///
/// ```rust
/// use cachelite::assert_timed_out;
/// use cachelite::retry::retry_until_true;
/// use std::time::Duration;
///
/// assert_timed_out!(retry_until_true(|| false, Some(Duration::ZERO)));
/// ```
#[macro_export]
macro_rules! assert_timed_out {
    ($result:expr) => {
        match $result {
            Err(e) if $crate::testing::IsTimeout::is_timeout(&e) => {}
            Err(e) => panic!("Expected timeout, got error: {:?}", e),
            Ok(v) => panic!("Expected timeout, got Ok: {:?}", v),
        }
    };
}

/// Assert how many times a [`FlakyOperation`] ran.
///
/// # Example
///
/// ```rust
/// use cachelite::assert_retried;
/// use cachelite::retry::retry_until_true;
/// use cachelite::testing::FlakyOperation;
/// use std::time::Duration;
///
/// let flaky = FlakyOperation::new(1, ());
/// retry_until_true(|| flaky.poll(), Some(Duration::from_secs(1))).unwrap();
/// assert_retried!(flaky, 2);
/// ```
#[macro_export]
macro_rules! assert_retried {
    ($operation:expr, $calls:expr) => {
        assert_eq!(
            $operation.calls(),
            $calls,
            "operation ran an unexpected number of times"
        );
    };
}

/// Errors that can report whether they represent a timeout. Used by
/// [`assert_timed_out!`](crate::assert_timed_out).
pub trait IsTimeout {
    /// True if this error is a timeout.
    fn is_timeout(&self) -> bool;
}

impl<E> IsTimeout for crate::retry::TimeoutError<E> {
    fn is_timeout(&self) -> bool {
        true
    }
}

impl<E> IsTimeout for crate::retry::RetryError<E> {
    fn is_timeout(&self) -> bool {
        crate::retry::RetryError::is_timeout(self)
    }
}
