//! Async retry loops.
//!
//! Same contracts as the blocking loops in [`executor`](super::executor):
//! identical attempt counting, identical backoff distribution, identical error
//! wrapping. The only difference is that the backoff wait is a tokio sleep,
//! so other tasks keep running while a retrier waits. Dropping the returned
//! future cancels the loop.

use std::future::Future;
use std::time::{Duration, Instant};

use super::backoff;
use super::error::TimeoutError;
use super::executor::within;

/// Async counterpart of [`retry_until_true`](super::retry_until_true).
///
/// # Examples
///
/// ```rust
/// use cachelite::retry::retry_until_true_async;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let counter = AtomicU32::new(0);
/// let calls = &counter;
/// let result = retry_until_true_async(
///     || async move { calls.fetch_add(1, Ordering::SeqCst) == 1 },
///     Some(Duration::from_secs(5)),
/// )
/// .await;
///
/// assert!(result.is_ok());
/// assert_eq!(calls.load(Ordering::SeqCst), 2);
/// # });
/// ```
pub async fn retry_until_true_async<F, Fut>(
    mut operation: F,
    timeout: Option<Duration>,
) -> Result<(), TimeoutError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = Instant::now();
    let mut attempt = 0u32;

    while within(timeout, start) {
        attempt = attempt.saturating_add(1);
        if operation().await {
            return Ok(());
        }
        let _delay = backoff::sleep_backoff_async(attempt).await;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            attempt,
            delay_ms = _delay.as_millis() as u64,
            "operation returned false, backed off"
        );
    }

    #[cfg(feature = "tracing")]
    tracing::warn!(attempts = attempt, ?timeout, "retry timed out");
    Err(TimeoutError::new(timeout, attempt, start.elapsed()))
}

/// Async counterpart of [`retry_on_error`](super::retry_on_error).
pub async fn retry_on_error_async<T, E, F, Fut>(
    mut operation: F,
    timeout: Option<Duration>,
) -> Result<T, TimeoutError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let start = Instant::now();
    let mut attempt = 0u32;
    let mut last_error = None;

    while within(timeout, start) {
        attempt = attempt.saturating_add(1);
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                last_error = Some(error);
                let _delay = backoff::sleep_backoff_async(attempt).await;
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    attempt,
                    delay_ms = _delay.as_millis() as u64,
                    "attempt failed, backed off"
                );
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::warn!(attempts = attempt, ?timeout, "retry timed out");
    Err(TimeoutError::new(timeout, attempt, start.elapsed()).with_last_error(last_error))
}

/// Async counterpart of [`retry_on_error_n`](super::retry_on_error_n).
///
/// # Examples
///
/// ```rust
/// use cachelite::retry::retry_on_error_n_async;
///
/// # tokio_test::block_on(async {
/// let result: Result<Option<u8>, &str> =
///     retry_on_error_n_async(|| async { Err("evicted") }, 2).await;
/// assert_eq!(result, Err("evicted"));
/// # });
/// ```
pub async fn retry_on_error_n_async<T, E, F, Fut>(
    mut operation: F,
    max_attempts: u32,
) -> Result<Option<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    for index in 0..max_attempts {
        match operation().await {
            Ok(value) => return Ok(Some(value)),
            Err(error) if index == max_attempts - 1 => {
                #[cfg(feature = "tracing")]
                tracing::warn!(attempts = max_attempts, "retry attempts exhausted");
                return Err(error);
            }
            Err(_) => {
                let _delay = backoff::sleep_backoff_async(index).await;
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    attempt = index + 1,
                    delay_ms = _delay.as_millis() as u64,
                    "attempt failed, backed off"
                );
            }
        }
    }

    Ok(None)
}
