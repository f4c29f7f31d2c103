//! Stop policies and retry configuration.

use std::time::Duration;

/// The rule that bounds a retry loop.
///
/// A policy is pure data: it says when to stop, not how to run. Exactly one
/// bound is active per call, so a timeout and an attempt budget cannot be
/// combined.
///
/// # Examples
///
/// ```rust
/// use cachelite::retry::StopPolicy;
/// use std::time::Duration;
///
/// let policy = StopPolicy::timeout(Duration::from_secs(2));
/// assert_eq!(policy, StopPolicy::Timeout(Some(Duration::from_secs(2))));
///
/// let policy = StopPolicy::max_attempts(3);
/// assert_eq!(policy, StopPolicy::MaxAttempts(3));
///
/// // Retries until the operation succeeds. Only use with operations that
/// // cannot fail permanently.
/// let policy = StopPolicy::forever();
/// assert!(policy.is_unbounded());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopPolicy {
    /// Stop once this much wall-clock time has elapsed. `None` never stops.
    Timeout(Option<Duration>),
    /// Stop after this many attempts. Zero means the operation never runs.
    MaxAttempts(u32),
}

impl StopPolicy {
    /// Stop once `timeout` has elapsed since the first attempt.
    pub fn timeout(timeout: Duration) -> Self {
        Self::Timeout(Some(timeout))
    }

    /// Never stop on time.
    pub fn forever() -> Self {
        Self::Timeout(None)
    }

    /// Stop after `n` attempts.
    pub fn max_attempts(n: u32) -> Self {
        Self::MaxAttempts(n)
    }

    /// True if the loop can run forever.
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Timeout(None))
    }
}

/// Serializable retry settings, typically embedded in a cache provider's
/// configuration.
///
/// Exactly one of the two fields must be set. Use
/// [`into_policy`](Self::into_policy) to validate and convert.
///
/// # Examples
///
/// ```rust
/// use cachelite::retry::{RetryConfig, StopPolicy};
/// use std::time::Duration;
///
/// let config = RetryConfig {
///     timeout_ms: Some(250),
///     ..RetryConfig::default()
/// };
/// assert_eq!(
///     config.into_policy(),
///     Ok(StopPolicy::timeout(Duration::from_millis(250)))
/// );
///
/// assert!(RetryConfig::default().into_policy().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct RetryConfig {
    /// Wall-clock budget in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Attempt budget.
    pub max_attempts: Option<u32>,
    /// Retry until success. Only valid when no other bound is set.
    pub forever: bool,
}

impl RetryConfig {
    /// Validate the configuration and turn it into a [`StopPolicy`].
    pub fn into_policy(self) -> Result<StopPolicy, PolicyError> {
        match (self.timeout_ms, self.max_attempts, self.forever) {
            (Some(ms), None, false) => Ok(StopPolicy::timeout(Duration::from_millis(ms))),
            (None, Some(n), false) => Ok(StopPolicy::max_attempts(n)),
            (None, None, true) => Ok(StopPolicy::forever()),
            (None, None, false) => Err(PolicyError::Missing),
            _ => Err(PolicyError::Conflicting),
        }
    }
}

impl From<StopPolicy> for RetryConfig {
    fn from(policy: StopPolicy) -> Self {
        match policy {
            StopPolicy::Timeout(Some(d)) => Self {
                timeout_ms: Some(u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
                ..Self::default()
            },
            StopPolicy::Timeout(None) => Self {
                forever: true,
                ..Self::default()
            },
            StopPolicy::MaxAttempts(n) => Self {
                max_attempts: Some(n),
                ..Self::default()
            },
        }
    }
}

/// Why a [`RetryConfig`] could not be turned into a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyError {
    /// No bound was configured.
    Missing,
    /// More than one bound was configured.
    Conflicting,
}

impl std::fmt::Display for PolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(
                f,
                "retry config must set one of timeout_ms, max_attempts or forever"
            ),
            Self::Conflicting => write!(
                f,
                "retry config must set only one of timeout_ms, max_attempts or forever"
            ),
        }
    }
}

impl std::error::Error for PolicyError {}

/// Information about a failed attempt, passed to retry hooks.
#[derive(Debug, Clone)]
pub struct RetryEvent<'a, E> {
    /// Which attempt just failed (1-indexed).
    pub attempt: u32,
    /// The error from the failed attempt. `None` for boolean operations that
    /// returned `false`.
    pub error: Option<&'a E>,
    /// Backoff delay about to be slept before the next attempt.
    pub next_delay: Duration,
    /// Total elapsed time since the retry call started.
    pub elapsed: Duration,
}
