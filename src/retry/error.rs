//! Error types for retry operations.

use std::convert::Infallible;
use std::time::Duration;

/// Error returned when a time-bounded retry loop runs out of time.
///
/// Carries the configured timeout, how many attempts were made, and, for the
/// error-recovery variants, the error from the most recent failed attempt.
///
/// # Examples
///
/// ```rust
/// use cachelite::retry::retry_on_error;
/// use std::error::Error;
/// use std::time::Duration;
///
/// let result = retry_on_error(
///     || Err::<(), _>(std::io::Error::other("store unavailable")),
///     Some(Duration::from_millis(20)),
/// );
///
/// let err = result.unwrap_err();
/// assert_eq!(err.timeout, Some(Duration::from_millis(20)));
/// assert!(err.attempts >= 1);
/// assert_eq!(err.source().unwrap().to_string(), "store unavailable");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutError<E = Infallible> {
    /// The timeout that was exceeded.
    ///
    /// Always `Some` when produced by the executors; `None` only appears on
    /// errors built by hand.
    pub timeout: Option<Duration>,
    /// Number of attempts made before giving up. May be zero.
    pub attempts: u32,
    /// Time spent in the retry loop.
    pub elapsed: Duration,
    /// The error from the last failed attempt, if any attempt failed with one.
    pub last_error: Option<E>,
}

impl<E> TimeoutError<E> {
    /// Create a timeout error with no underlying cause.
    pub fn new(timeout: Option<Duration>, attempts: u32, elapsed: Duration) -> Self {
        Self {
            timeout,
            attempts,
            elapsed,
            last_error: None,
        }
    }

    /// Attach the last error seen before the timeout.
    pub fn with_last_error(mut self, error: Option<E>) -> Self {
        self.last_error = error;
        self
    }

    /// Get a reference to the last underlying error.
    pub fn last_error(&self) -> Option<&E> {
        self.last_error.as_ref()
    }

    /// Extract the last underlying error, discarding metadata.
    pub fn into_last_error(self) -> Option<E> {
        self.last_error
    }
}

impl<E: std::fmt::Display> std::fmt::Display for TimeoutError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.timeout {
            Some(timeout) => write!(
                f,
                "exceeded timeout of {:?} after {} attempts",
                timeout, self.attempts
            )?,
            None => write!(f, "timed out after {} attempts", self.attempts)?,
        }
        if let Some(e) = &self.last_error {
            write!(f, ": {}", e)?;
        }
        Ok(())
    }
}

impl<E: std::error::Error + 'static> std::error::Error for TimeoutError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.last_error
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Error returned by [`Retrier`](super::Retrier), whose stop policy is chosen
/// at runtime.
///
/// The two variants keep the two failure contracts apart: a time budget always
/// ends in a [`TimeoutError`], an attempt budget hands back the final
/// operation error untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// A time-bounded policy ran out of time.
    Timeout(TimeoutError<E>),
    /// The last attempt of a count-bounded policy failed with this error.
    Failed(E),
}

impl<E> RetryError<E> {
    /// Returns true if this is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// The underlying operation error, if there is one.
    pub fn operation_error(&self) -> Option<&E> {
        match self {
            Self::Timeout(t) => t.last_error(),
            Self::Failed(e) => Some(e),
        }
    }

    /// Extract the underlying operation error, if there is one.
    pub fn into_operation_error(self) -> Option<E> {
        match self {
            Self::Timeout(t) => t.into_last_error(),
            Self::Failed(e) => Some(e),
        }
    }
}

impl<E> From<TimeoutError<E>> for RetryError<E> {
    fn from(err: TimeoutError<E>) -> Self {
        Self::Timeout(err)
    }
}

impl<E: std::fmt::Display> std::fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout(t) => write!(f, "{}", t),
            Self::Failed(e) => write!(f, "{}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Timeout(t) => Some(t),
            Self::Failed(e) => Some(e),
        }
    }
}
