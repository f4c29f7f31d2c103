//! Blocking retry loops.
//!
//! Every loop here runs the operation on the calling thread and sleeps the
//! thread between attempts using [`backoff`](super::backoff). Operation
//! failures are values, not panics: a loop branches on `bool` or `Result` and
//! never unwinds.

use std::convert::Infallible;
use std::time::{Duration, Instant};

use super::backoff;
use super::error::{RetryError, TimeoutError};
use super::policy::{PolicyError, RetryConfig, RetryEvent, StopPolicy};

/// Retry `operation` until it returns `true`.
///
/// Elapsed time is checked before every attempt, the first one included, so a
/// zero timeout makes no attempts at all. With `timeout == None` the loop only
/// ends when the operation succeeds; do not use that with an operation that
/// can fail permanently.
///
/// # Examples
///
/// ```rust
/// use cachelite::retry::retry_until_true;
/// use std::time::Duration;
///
/// let mut calls = 0;
/// let result = retry_until_true(
///     || {
///         calls += 1;
///         calls == 3
///     },
///     Some(Duration::from_secs(5)),
/// );
///
/// assert!(result.is_ok());
/// assert_eq!(calls, 3);
/// ```
pub fn retry_until_true<F>(operation: F, timeout: Option<Duration>) -> Result<(), TimeoutError>
where
    F: FnMut() -> bool,
{
    until_true_loop(operation, timeout, |_| {})
}

/// Retry `operation` until it returns `Ok`, or until `timeout` elapses.
///
/// Each failure replaces the previously captured error. On timeout the last
/// captured error travels inside the [`TimeoutError`] so callers can see why
/// the attempts were failing.
///
/// # Examples
///
/// ```rust
/// use cachelite::retry::retry_on_error;
/// use std::time::Duration;
///
/// let mut calls = 0;
/// let value = retry_on_error(
///     || {
///         calls += 1;
///         if calls < 2 { Err("connection reset") } else { Ok(calls) }
///     },
///     Some(Duration::from_secs(5)),
/// );
///
/// assert_eq!(value, Ok(2));
/// ```
pub fn retry_on_error<T, E, F>(
    operation: F,
    timeout: Option<Duration>,
) -> Result<T, TimeoutError<E>>
where
    F: FnMut() -> Result<T, E>,
{
    on_error_loop(operation, timeout, |_| {})
}

/// Run `operation` up to `max_attempts` times, stopping at the first `Ok`.
///
/// If the final attempt fails, its error is returned as is; it is not
/// wrapped. Returns `Ok(None)` without running anything when `max_attempts`
/// is zero.
///
/// The backoff between attempts is keyed on the zero-based attempt index,
/// so the first wait is at most a millisecond.
///
/// # Examples
///
/// ```rust
/// use cachelite::retry::retry_on_error_n;
///
/// let mut calls = 0;
/// let result: Result<Option<()>, &str> = retry_on_error_n(
///     || {
///         calls += 1;
///         Err("still down")
///     },
///     3,
/// );
///
/// assert_eq!(result, Err("still down"));
/// assert_eq!(calls, 3);
///
/// let untouched: Result<Option<()>, &str> = retry_on_error_n(|| unreachable!(), 0);
/// assert_eq!(untouched, Ok(None));
/// ```
pub fn retry_on_error_n<T, E, F>(operation: F, max_attempts: u32) -> Result<Option<T>, E>
where
    F: FnMut() -> Result<T, E>,
{
    on_error_n_loop(operation, max_attempts, |_| {})
}

#[inline]
pub(crate) fn within(timeout: Option<Duration>, start: Instant) -> bool {
    timeout.is_none_or(|t| start.elapsed() < t)
}

fn until_true_loop<F, H>(
    mut operation: F,
    timeout: Option<Duration>,
    mut on_retry: H,
) -> Result<(), TimeoutError>
where
    F: FnMut() -> bool,
    H: FnMut(&RetryEvent<'_, Infallible>),
{
    let start = Instant::now();
    let mut attempt = 0u32;

    while within(timeout, start) {
        attempt = attempt.saturating_add(1);
        if operation() {
            return Ok(());
        }

        let next_delay = backoff::delay_for_attempt(attempt);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            attempt,
            delay_ms = next_delay.as_millis() as u64,
            "operation returned false, backing off"
        );
        on_retry(&RetryEvent {
            attempt,
            error: None,
            next_delay,
            elapsed: start.elapsed(),
        });
        std::thread::sleep(next_delay);
    }

    #[cfg(feature = "tracing")]
    tracing::warn!(attempts = attempt, ?timeout, "retry timed out");
    Err(TimeoutError::new(timeout, attempt, start.elapsed()))
}

fn on_error_loop<T, E, F, H>(
    mut operation: F,
    timeout: Option<Duration>,
    mut on_retry: H,
) -> Result<T, TimeoutError<E>>
where
    F: FnMut() -> Result<T, E>,
    H: FnMut(&RetryEvent<'_, E>),
{
    let start = Instant::now();
    let mut attempt = 0u32;
    let mut last_error = None;

    while within(timeout, start) {
        attempt = attempt.saturating_add(1);
        match operation() {
            Ok(value) => return Ok(value),
            Err(error) => {
                let next_delay = backoff::delay_for_attempt(attempt);
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    attempt,
                    delay_ms = next_delay.as_millis() as u64,
                    "attempt failed, backing off"
                );
                on_retry(&RetryEvent {
                    attempt,
                    error: Some(&error),
                    next_delay,
                    elapsed: start.elapsed(),
                });
                last_error = Some(error);
                std::thread::sleep(next_delay);
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::warn!(attempts = attempt, ?timeout, "retry timed out");
    Err(TimeoutError::new(timeout, attempt, start.elapsed()).with_last_error(last_error))
}

fn on_error_n_loop<T, E, F, H>(
    mut operation: F,
    max_attempts: u32,
    mut on_retry: H,
) -> Result<Option<T>, E>
where
    F: FnMut() -> Result<T, E>,
    H: FnMut(&RetryEvent<'_, E>),
{
    let start = Instant::now();

    for index in 0..max_attempts {
        match operation() {
            Ok(value) => return Ok(Some(value)),
            Err(error) if index == max_attempts - 1 => {
                #[cfg(feature = "tracing")]
                tracing::warn!(attempts = max_attempts, "retry attempts exhausted");
                return Err(error);
            }
            Err(error) => {
                let next_delay = backoff::delay_for_attempt(index);
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    attempt = index + 1,
                    delay_ms = next_delay.as_millis() as u64,
                    "attempt failed, backing off"
                );
                on_retry(&RetryEvent {
                    attempt: index + 1,
                    error: Some(&error),
                    next_delay,
                    elapsed: start.elapsed(),
                });
                std::thread::sleep(next_delay);
            }
        }
    }

    Ok(None)
}

/// A retry executor whose stop policy is chosen at runtime, for example from
/// a provider's configuration file.
///
/// # Examples
///
/// ```rust
/// use cachelite::retry::{Retrier, RetryError, StopPolicy};
///
/// let retrier = Retrier::new(StopPolicy::max_attempts(2));
/// let mut calls = 0;
/// let result = retrier.run(|| {
///     calls += 1;
///     Err::<(), _>("replica offline")
/// });
///
/// assert_eq!(result, Err(RetryError::Failed("replica offline")));
/// assert_eq!(calls, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retrier {
    policy: StopPolicy,
}

impl Retrier {
    /// Create a retrier for `policy`.
    pub fn new(policy: StopPolicy) -> Self {
        Self { policy }
    }

    /// Validate `config` and build a retrier from it.
    pub fn from_config(config: RetryConfig) -> Result<Self, PolicyError> {
        config.into_policy().map(Self::new)
    }

    /// The active stop policy.
    pub fn policy(&self) -> StopPolicy {
        self.policy
    }

    /// Retry a boolean operation until it returns `true`.
    ///
    /// Under a time policy this is [`retry_until_true`]. Under an attempt
    /// budget the operation runs at most `n` times and the retrier reports a
    /// [`TimeoutError`] with `timeout == None` when every attempt returned
    /// `false`. A budget of zero never runs the operation and returns `Ok(())`,
    /// the same way [`run`](Self::run) returns `Ok(None)`.
    pub fn until_true<F>(&self, operation: F) -> Result<(), TimeoutError>
    where
        F: FnMut() -> bool,
    {
        self.until_true_with_hooks(operation, |_| {})
    }

    /// [`until_true`](Self::until_true) with a hook called after each failed
    /// attempt.
    pub fn until_true_with_hooks<F, H>(
        &self,
        mut operation: F,
        on_retry: H,
    ) -> Result<(), TimeoutError>
    where
        F: FnMut() -> bool,
        H: FnMut(&RetryEvent<'_, Infallible>),
    {
        match self.policy {
            StopPolicy::Timeout(timeout) => until_true_loop(operation, timeout, on_retry),
            StopPolicy::MaxAttempts(n) => {
                let start = Instant::now();
                let outcome = on_error_n_loop(
                    || if operation() { Ok(()) } else { Err(()) },
                    n,
                    adapt_unit_hook(on_retry),
                );
                match outcome {
                    Ok(_) => Ok(()),
                    Err(()) => Err(TimeoutError::new(None, n, start.elapsed())),
                }
            }
        }
    }

    /// Retry a fallible operation under the configured policy.
    ///
    /// A time policy that runs out yields [`RetryError::Timeout`]; an attempt
    /// budget whose last attempt fails yields [`RetryError::Failed`] with the
    /// untouched error. `Ok(None)` only occurs for `MaxAttempts(0)`.
    pub fn run<T, E, F>(&self, operation: F) -> Result<Option<T>, RetryError<E>>
    where
        F: FnMut() -> Result<T, E>,
    {
        self.run_with_hooks(operation, |_| {})
    }

    /// [`run`](Self::run) with a hook called after each failed attempt that
    /// will be retried.
    ///
    /// The hook is synchronous and runs before the backoff sleep; keep it
    /// cheap (logging, metrics).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cachelite::retry::{Retrier, RetryEvent, StopPolicy};
    ///
    /// let mut seen = Vec::new();
    /// let mut calls = 0;
    /// let result = Retrier::new(StopPolicy::max_attempts(5)).run_with_hooks(
    ///     || {
    ///         calls += 1;
    ///         if calls < 3 { Err("busy") } else { Ok("hit") }
    ///     },
    ///     |event: &RetryEvent<'_, &str>| seen.push(event.attempt),
    /// );
    ///
    /// assert_eq!(result, Ok(Some("hit")));
    /// assert_eq!(seen, vec![1, 2]);
    /// ```
    pub fn run_with_hooks<T, E, F, H>(
        &self,
        operation: F,
        on_retry: H,
    ) -> Result<Option<T>, RetryError<E>>
    where
        F: FnMut() -> Result<T, E>,
        H: FnMut(&RetryEvent<'_, E>),
    {
        match self.policy {
            StopPolicy::Timeout(timeout) => on_error_loop(operation, timeout, on_retry)
                .map(Some)
                .map_err(RetryError::Timeout),
            StopPolicy::MaxAttempts(n) => {
                on_error_n_loop(operation, n, on_retry).map_err(RetryError::Failed)
            }
        }
    }
}

impl From<StopPolicy> for Retrier {
    fn from(policy: StopPolicy) -> Self {
        Self::new(policy)
    }
}

fn adapt_unit_hook<H>(mut on_retry: H) -> impl FnMut(&RetryEvent<'_, ()>)
where
    H: FnMut(&RetryEvent<'_, Infallible>),
{
    move |event: &RetryEvent<'_, ()>| {
        on_retry(&RetryEvent {
            attempt: event.attempt,
            error: None,
            next_delay: event.next_delay,
            elapsed: event.elapsed,
        })
    }
}
