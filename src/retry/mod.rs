//! Retry with quadratic jittered backoff.
//!
//! Wraps calls against a flaky cache provider so that transient failures are
//! retried instead of surfacing to the caller:
//!
//! - [`retry_until_true`]: retry a boolean operation until it reports success
//!   or a timeout elapses
//! - [`retry_on_error`]: retry a fallible operation until it succeeds or a
//!   timeout elapses; the timeout carries the last error as its cause
//! - [`retry_on_error_n`]: retry a fallible operation a fixed number of times;
//!   the last error comes back unwrapped
//! - [`Retrier`]: the same loops driven by a [`StopPolicy`] picked at runtime
//!   (for example from a [`RetryConfig`]), with optional retry hooks
//!
//! Between attempts the loops sleep a delay drawn from
//! `[i², (i+1)²]` milliseconds, see [`backoff`].
//!
//! # Quick Start
//!
//! ```rust
//! use cachelite::retry::{retry_on_error, retry_on_error_n};
//! use std::time::Duration;
//!
//! let mut misses = 0;
//! let value = retry_on_error(
//!     || {
//!         misses += 1;
//!         if misses < 3 { Err("not yet") } else { Ok("cached") }
//!     },
//!     Some(Duration::from_secs(1)),
//! );
//! assert_eq!(value, Ok("cached"));
//!
//! let result: Result<Option<()>, _> = retry_on_error_n(|| Err("down"), 2);
//! assert_eq!(result, Err("down"));
//! ```
//!
//! # Async
//!
//! With the `async` feature the `*_async` variants suspend on a tokio timer
//! instead of blocking the thread.
//!
//! # Error Types
//!
//! - [`TimeoutError`]: a time budget ran out
//! - [`RetryError`]: outcome of a [`Retrier`], either a timeout or the final
//!   operation error

pub mod backoff;
mod error;
mod executor;
mod policy;

#[cfg(feature = "async")]
mod async_executor;

pub use error::{RetryError, TimeoutError};
pub use executor::{retry_on_error, retry_on_error_n, retry_until_true, Retrier};
pub use policy::{PolicyError, RetryConfig, RetryEvent, StopPolicy};

#[cfg(feature = "async")]
pub use async_executor::{retry_on_error_async, retry_on_error_n_async, retry_until_true_async};
