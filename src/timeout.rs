//! Timeout policy for bounding the duration of a single external call.
//!
//! Semantics
//! - Wraps an async operation and returns `ResilienceError::Timeout` when the deadline elapses.
//! - Uses `tokio::time::timeout`; on timeout the inner future is dropped (not forcibly aborted),
//!   so cancellation-unsafe work may leave partial state.
//! - Elapsed is measured from just before invoking the closure to timeout firing and can be
//!   slightly greater than the configured duration due to scheduling overhead.
//!
//! Per spec.md §7, a timeout is treated as a transient failure for retries, and is classified as
//! `Health::Unknown` (not a permanent error) when it bounds a probe call.

use crate::ResilienceError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Maximum allowed timeout duration (5 minutes), wide enough for every per-API
/// timeout named in spec.md §6 (5-300s) while still catching misconfiguration.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(300);

/// Errors returned when configuring timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutError {
    /// Duration must be greater than zero.
    ZeroDuration,
    /// Duration exceeded configured maximum.
    ExceedsMaximum { requested: Duration, limit: Duration },
}

impl std::fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeoutError::ZeroDuration => write!(f, "timeout duration must be > 0"),
            TimeoutError::ExceedsMaximum { requested, limit } => write!(
                f,
                "timeout duration {:?} exceeds maximum allowed {:?}",
                requested, limit
            ),
        }
    }
}

impl std::error::Error for TimeoutError {}

/// Policy that enforces a maximum duration on a single async operation.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutPolicy {
    duration: Duration,
}

impl TimeoutPolicy {
    #[must_use = "the result must be checked for validation errors"]
    pub fn new(duration: Duration) -> Result<Self, TimeoutError> {
        Self::new_with_max(duration, MAX_TIMEOUT)
    }

    pub fn new_with_max(duration: Duration, max: Duration) -> Result<Self, TimeoutError> {
        if duration.is_zero() {
            return Err(TimeoutError::ZeroDuration);
        }
        if duration > max {
            return Err(TimeoutError::ExceedsMaximum { requested: duration, limit: max });
        }
        Ok(Self { duration })
    }

    #[must_use]
    #[inline]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Execute an operation with a timeout.
    ///
    /// - Returns `Ok(T)` when the operation finishes before the deadline.
    /// - Returns `Err(ResilienceError::Timeout { elapsed, timeout })` when the deadline elapses.
    pub async fn execute<T, E, Fut, Op>(&self, operation: Op) -> Result<T, ResilienceError<E>>
    where
        T: Send,
        E: std::error::Error + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ResilienceError<E>>> + Send,
        Op: FnOnce() -> Fut + Send,
    {
        let start = Instant::now();

        match tokio::time::timeout(self.duration, operation()).await {
            Ok(result) => result,
            Err(_) => {
                let elapsed = start.elapsed();
                Err(ResilienceError::Timeout { elapsed, timeout: self.duration })
            }
        }
    }
}
