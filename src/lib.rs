//! # CacheLite
//!
//! Retry execution and capability contracts for cache providers.
//!
//! Cache stores fail in boring, transient ways: a replica is restarting, a
//! connection was reset, a lock is briefly held. This crate wraps calls against
//! such stores so that they are retried with a growing, randomized delay, fans
//! operations out across replicas, and defines the optional capabilities a
//! provider can offer.
//!
//! - [`retry`]: retry loops bounded by a timeout or an attempt budget, with
//!   quadratic jittered backoff
//! - [`dispatch`]: run one operation against several provider instances, in
//!   order
//! - [`cache`]: the [`RemoveByPattern`](cache::RemoveByPattern) and
//!   [`DeflateProvider`](cache::DeflateProvider) contracts
//! - [`testing`]: an in-memory provider and scripted flaky operations
//!
//! ## Quick Example
//!
//! ```rust
//! use cachelite::cache::{DeflateProvider, FlateProvider, RemoveByPattern};
//! use cachelite::retry::retry_on_error;
//! use cachelite::testing::MemoryCache;
//! use std::time::Duration;
//!
//! let cache = MemoryCache::from_iter([("user:1", "ada"), ("user:2", "bob"), ("order:1", "x")]);
//!
//! // Evict all users, retrying for up to a second if the store is busy
//! let removed = retry_on_error(
//!     || cache.remove_by_pattern("user:*"),
//!     Some(Duration::from_secs(1)),
//! )
//! .unwrap();
//! assert_eq!(removed, 2);
//!
//! // Values can be stored compressed
//! let provider = FlateProvider::default();
//! let packed = provider.deflate("a long cached value").unwrap();
//! assert_eq!(provider.inflate(&packed).unwrap(), "a long cached value");
//! ```
//!
//! ## Features
//!
//! - `async`: `*_async` retry loops that suspend on a tokio timer
//! - `tracing`: debug/warn events for failed attempts, timeouts and evictions
//! - `serde`: `Serialize`/`Deserialize` for [`RetryConfig`](retry::RetryConfig)

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod cache;
pub mod dispatch;
pub mod retry;
pub mod testing;

// Re-exports
pub use cache::{CacheError, DeflateProvider, RemoveByPattern};
pub use dispatch::ExecExt;
pub use retry::{Retrier, RetryConfig, RetryError, StopPolicy, TimeoutError};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cache::{CacheError, DeflateProvider, RemoveByPattern};
    pub use crate::dispatch::ExecExt;
    pub use crate::retry::{
        retry_on_error, retry_on_error_n, retry_until_true, Retrier, RetryError, StopPolicy,
        TimeoutError,
    };
}
