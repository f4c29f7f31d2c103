//! Quadratic jittered backoff.
//!
//! The delay before retrying after attempt `i` is drawn uniformly from the
//! closed range `[i², (i+1)²]` milliseconds. The bound grows quadratically while
//! the randomization inside each bound keeps concurrent retriers from waking up
//! in lockstep against the same backing store.
//!
//! | attempt | range (ms) |
//! |---------|------------|
//! | 0       | 0 ..= 1    |
//! | 1       | 1 ..= 4    |
//! | 2       | 4 ..= 9    |
//! | 10      | 100 ..= 121|
//!
//! # Examples
//!
//! ```rust
//! use cachelite::retry::backoff;
//! use std::time::Duration;
//!
//! let delay = backoff::delay_for_attempt(3);
//! assert!(delay >= Duration::from_millis(9));
//! assert!(delay <= Duration::from_millis(16));
//! ```

use std::time::Duration;

use rand::Rng;

/// Inclusive lower and upper bound of the delay for `attempt`.
///
/// Saturates instead of overflowing for very large attempt numbers.
///
/// ```rust
/// use cachelite::retry::backoff;
/// use std::time::Duration;
///
/// assert_eq!(
///     backoff::bounds(2),
///     (Duration::from_millis(4), Duration::from_millis(9))
/// );
/// ```
pub fn bounds(attempt: u32) -> (Duration, Duration) {
    let (low, high) = bounds_millis(attempt);
    (Duration::from_millis(low), Duration::from_millis(high))
}

fn bounds_millis(attempt: u32) -> (u64, u64) {
    let i = u64::from(attempt);
    let next = i.saturating_add(1);
    (i.saturating_mul(i), next.saturating_mul(next))
}

/// Sample the backoff delay for `attempt` without sleeping.
///
/// Every call draws from the calling thread's own OS-seeded generator, so
/// retry loops running on different threads never share (or contend on) a
/// random stream.
pub fn delay_for_attempt(attempt: u32) -> Duration {
    let (low, high) = bounds_millis(attempt);
    let millis = rand::rng().random_range(low..=high);
    Duration::from_millis(millis)
}

/// Sample the delay for `attempt` and block the current thread for it.
///
/// Returns the delay that was slept.
pub fn sleep_backoff(attempt: u32) -> Duration {
    let delay = delay_for_attempt(attempt);
    std::thread::sleep(delay);
    delay
}

/// Async counterpart of [`sleep_backoff`].
///
/// Same distribution, but the wait is a tokio suspension point rather than a
/// thread block.
#[cfg(feature = "async")]
pub async fn sleep_backoff_async(attempt: u32) -> Duration {
    let delay = delay_for_attempt(attempt);
    tokio::time::sleep(delay).await;
    delay
}
