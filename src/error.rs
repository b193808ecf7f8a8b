//! Error types for the resilience substrate (circuit breaker + retry engine).

use std::fmt;
use std::time::Duration;

/// Cap the number of stored failures inside RetryExhausted to avoid unbounded growth.
pub const MAX_RETRY_FAILURES: usize = 10;

/// Unified error type for the resilience substrate wrapping external I/O.
#[derive(Debug)]
pub enum ResilienceError<E> {
    /// The operation exceeded its per-category timeout.
    Timeout { elapsed: Duration, timeout: Duration },
    /// The circuit breaker is open and rejected the call without invoking it.
    CircuitOpen { failure_count: usize, open_duration: Duration },
    /// All retry attempts were exhausted.
    RetryExhausted { attempts: usize, failures: Vec<E> },
    /// The underlying operation failed (and was not retryable, or was the
    /// final non-retryable failure).
    Inner(E),
}

impl<E: Clone> Clone for ResilienceError<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Timeout { elapsed, timeout } => {
                Self::Timeout { elapsed: *elapsed, timeout: *timeout }
            }
            Self::CircuitOpen { failure_count, open_duration } => {
                Self::CircuitOpen { failure_count: *failure_count, open_duration: *open_duration }
            }
            Self::RetryExhausted { attempts, failures } => {
                Self::RetryExhausted { attempts: *attempts, failures: failures.clone() }
            }
            Self::Inner(e) => Self::Inner(e.clone()),
        }
    }
}

impl<E: PartialEq> PartialEq for ResilienceError<E> {
    fn eq(&self, other: &Self) -> bool {
        use ResilienceError::*;
        match (self, other) {
            (Timeout { elapsed: a1, timeout: b1 }, Timeout { elapsed: a2, timeout: b2 }) => {
                a1 == a2 && b1 == b2
            }
            (
                CircuitOpen { failure_count: f1, open_duration: d1 },
                CircuitOpen { failure_count: f2, open_duration: d2 },
            ) => f1 == f2 && d1 == d2,
            (
                RetryExhausted { attempts: a1, failures: f1 },
                RetryExhausted { attempts: a2, failures: f2 },
            ) => a1 == a2 && f1 == f2,
            (Inner(e1), Inner(e2)) => e1 == e2,
            _ => false,
        }
    }
}

impl<E: Eq> Eq for ResilienceError<E> {}

impl<E: fmt::Display> fmt::Display for ResilienceError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { elapsed, timeout } => {
                write!(f, "operation timed out after {:?} (limit: {:?})", elapsed, timeout)
            }
            Self::CircuitOpen { failure_count, open_duration } => {
                write!(
                    f,
                    "circuit breaker open ({} failures, open for {:?})",
                    failure_count, open_duration
                )
            }
            Self::RetryExhausted { attempts, failures } => {
                let last = failures.last().map(|e| e.to_string()).unwrap_or_default();
                write!(
                    f,
                    "retry exhausted after {} attempts ({} failures), last error: {}",
                    attempts,
                    failures.len(),
                    last
                )
            }
            Self::Inner(e) => write!(f, "{}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for ResilienceError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Inner(e) => Some(e),
            Self::RetryExhausted { failures, .. } => {
                failures.last().map(|e| e as &dyn std::error::Error)
            }
            _ => None,
        }
    }
}

impl<E> ResilienceError<E> {
    /// Check if this error is due to timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if this error is due to the circuit breaker being open.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, Self::CircuitOpen { .. })
    }

    /// Check if this error is due to retry exhaustion.
    pub fn is_retry_exhausted(&self) -> bool {
        matches!(self, Self::RetryExhausted { .. })
    }

    /// Get the inner error if this is an Inner variant.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Inner(e) => Some(e),
            _ => None,
        }
    }

    /// Access all recorded failures for RetryExhausted, if present.
    pub fn failures(&self) -> Option<&[E]> {
        match self {
            Self::RetryExhausted { failures, .. } => Some(failures.as_slice()),
            _ => None,
        }
    }

    /// Check if this error wraps an inner error.
    pub fn is_inner(&self) -> bool {
        matches!(self, Self::Inner(_))
    }

    /// Borrow the inner error if present.
    pub fn as_inner(&self) -> Option<&E> {
        match self {
            Self::Inner(e) => Some(e),
            _ => None,
        }
    }
}
