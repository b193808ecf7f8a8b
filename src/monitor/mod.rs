//! Monitor Client capability interfaces (§4.3).
//!
//! These are the external collaborators the core consumes: a backend health probe, a
//! BGP session probe, a route-advertisement toggle, and a bulk transit-priority
//! update. Real implementations wrap vendor SDKs (out of scope here, per spec.md's
//! Non-goals); [`http`] provides a generic `reqwest`-based adapter as a stand-in, and
//! [`fakes`] provides in-memory implementations for tests.

pub mod fakes;
pub mod http;

use crate::health::Health;
use crate::plan::TransitPriority;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Result of a single actuation write, before the actuator overlays passive-mode
/// `Skipped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Success,
    /// The current and desired state already agreed; no mutation was issued.
    NoChange,
    Failure,
}

/// Errors surfaced by the transport underneath a monitor client call, classified per
/// §7 into permanent / known-transient / unclassified buckets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// The per-category timeout elapsed (mapped here from `ResilienceError::Timeout`
    /// so the generic retry engine's Inner-only retry path applies to it).
    Timeout { elapsed: Duration, timeout: Duration },
    /// Authorization denied, resource not found, or similar: re-raised, never
    /// silently swallowed.
    Permanent { status: u16, message: String },
    /// Rate-limited or server error: known transient, retried then mapped to UNKNOWN.
    Transient { status: u16, message: String },
    /// Connection-level failure (refused, reset, DNS) with no status code.
    Transport { message: String },
    /// An unrecognized status code: treated as transient for retry purposes, logged
    /// with full context.
    Unclassified { status: u16, message: String },
}

impl HttpError {
    /// Permanent errors are re-raised immediately; everything else is retried.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, HttpError::Permanent { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Permanent { status, .. }
            | HttpError::Transient { status, .. }
            | HttpError::Unclassified { status, .. } => Some(*status),
            HttpError::Timeout { .. } | HttpError::Transport { .. } => None,
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::Timeout { elapsed, timeout } => {
                write!(f, "timed out after {elapsed:?} (limit {timeout:?})")
            }
            HttpError::Permanent { status, message } => {
                write!(f, "permanent error {status}: {message}")
            }
            HttpError::Transient { status, message } => {
                write!(f, "transient error {status}: {message}")
            }
            HttpError::Transport { message } => write!(f, "transport error: {message}"),
            HttpError::Unclassified { status, message } => {
                write!(f, "unclassified status {status}: {message}")
            }
        }
    }
}

impl std::error::Error for HttpError {}

/// Classify an HTTP status code per §7's three error classes.
pub fn classify_status(status: u16, message: impl Into<String>) -> HttpError {
    let message = message.into();
    match status {
        401 | 403 | 404 => HttpError::Permanent { status, message },
        408 | 429 | 500..=599 => HttpError::Transient { status, message },
        _ => HttpError::Unclassified { status, message },
    }
}

#[async_trait]
pub trait BackendHealthProbe: Send + Sync {
    /// HEALTHY if every backend reports a known-good status; UNHEALTHY if all known
    /// statuses are bad; UNKNOWN if the monitoring call fails with a transient or
    /// unclassified error.
    async fn probe(&self, region: &str) -> Health;
}

#[async_trait]
pub trait BgpSessionProbe: Send + Sync {
    /// HEALTHY iff all sessions on the router are UP; UNHEALTHY iff any declared
    /// session is DOWN; UNKNOWN on transient/unclassified error.
    async fn bgp(&self, region: &str, router: &str) -> Health;
}

#[async_trait]
pub trait RouteAdvertiser: Send + Sync {
    /// `desired = None` means no-op; callers MUST NOT invoke this when the plan
    /// carries `None` for the prefix in question.
    async fn advertise(
        &self,
        region: &str,
        router: &str,
        prefix: &str,
        desired: bool,
    ) -> WriteOutcome;
}

#[async_trait]
pub trait TransitPriorityClient: Send + Sync {
    /// Bulk-updates every route whose description contains `selector` (case-sensitive).
    async fn set_priority(
        &self,
        account: &str,
        selector: &str,
        priority: TransitPriority,
    ) -> WriteOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_auth_errors_as_permanent() {
        assert!(matches!(classify_status(401, "denied"), HttpError::Permanent { .. }));
        assert!(matches!(classify_status(403, "denied"), HttpError::Permanent { .. }));
        assert!(matches!(classify_status(404, "missing"), HttpError::Permanent { .. }));
    }

    #[test]
    fn classifies_rate_limit_and_server_errors_as_transient() {
        assert!(matches!(classify_status(429, "slow down"), HttpError::Transient { .. }));
        assert!(matches!(classify_status(503, "unavailable"), HttpError::Transient { .. }));
    }

    #[test]
    fn classifies_unknown_codes_as_unclassified() {
        assert!(matches!(classify_status(432, "???"), HttpError::Unclassified { .. }));
    }

    #[test]
    fn only_permanent_errors_are_non_retryable() {
        assert!(!classify_status(401, "x").is_retryable());
        assert!(classify_status(500, "x").is_retryable());
        assert!(classify_status(432, "x").is_retryable());
        assert!(HttpError::Timeout { elapsed: Duration::from_secs(1), timeout: Duration::from_secs(1) }
            .is_retryable());
    }
}
