//! Circuit breaker guarding a single external dependency.
//!
//! Only two states are modeled: `Closed` (calls pass through, failures are
//! counted) and `Open` (calls are rejected without invoking the operation).
//! There is no explicit half-open state: once `recovery_timeout` has elapsed
//! since the circuit opened, the next call is let through as a trial. If it
//! succeeds the circuit closes and the failure count resets; if it fails the
//! circuit reopens immediately and the timeout starts again. All state lives
//! behind a single mutex, so there is no lock-free fast path, but the policy
//! and its invariants stay easy to reason about and to test deterministically.

use crate::clock::{Clock, MonotonicClock};
use crate::ResilienceError;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
}

#[derive(Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: usize,
    pub recovery_timeout: Duration,
}

impl CircuitBreakerConfig {
    /// A breaker that never trips: used when an external category is
    /// configured with an unbounded threshold.
    pub fn disabled() -> Self {
        Self { failure_threshold: usize::MAX, recovery_timeout: Duration::from_secs(0) }
    }
}

struct Inner {
    state: CircuitState,
    failure_count: usize,
    opened_at_millis: u64,
}

#[derive(Clone)]
pub struct CircuitBreakerPolicy {
    inner: Arc<Mutex<Inner>>,
    config: CircuitBreakerConfig,
    clock: Arc<dyn Clock>,
}

impl CircuitBreakerPolicy {
    pub fn new(failure_threshold: usize, recovery_timeout: Duration) -> Self {
        Self::with_config(CircuitBreakerConfig { failure_threshold, recovery_timeout })
    }

    pub fn with_config(config: CircuitBreakerConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: CircuitState::Closed,
                failure_count: 0,
                opened_at_millis: 0,
            })),
            config,
            clock: Arc::new(MonotonicClock::default()),
        }
    }

    /// Override the clock (useful for deterministic tests).
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Current state, primarily for observability/telemetry.
    pub fn state(&self) -> CircuitState {
        self.inner.lock().expect("circuit breaker mutex poisoned").state
    }

    pub async fn execute<T, E, Fut, Op>(&self, operation: Op) -> Result<T, ResilienceError<E>>
    where
        T: Send,
        E: std::error::Error + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ResilienceError<E>>> + Send,
        Op: FnOnce() -> Fut + Send,
    {
        {
            let mut guard = self.inner.lock().expect("circuit breaker mutex poisoned");
            if guard.state == CircuitState::Open {
                let elapsed = self.now_millis().saturating_sub(guard.opened_at_millis);
                if elapsed < self.config.recovery_timeout.as_millis() as u64 {
                    return Err(ResilienceError::CircuitOpen {
                        failure_count: guard.failure_count,
                        open_duration: Duration::from_millis(elapsed),
                    });
                }
                // Recovery timeout elapsed: let this call through as a trial.
                tracing::info!("circuit breaker: recovery timeout elapsed, admitting trial call");
            }
        }

        let result = operation().await;

        match &result {
            Ok(_) => self.on_success(),
            Err(_) => self.on_failure(),
        }

        result
    }

    fn on_success(&self) {
        let mut guard = self.inner.lock().expect("circuit breaker mutex poisoned");
        if guard.state == CircuitState::Open {
            tracing::info!("circuit breaker → closed (trial call succeeded)");
        }
        guard.state = CircuitState::Closed;
        guard.failure_count = 0;
        guard.opened_at_millis = 0;
    }

    fn on_failure(&self) {
        let mut guard = self.inner.lock().expect("circuit breaker mutex poisoned");
        guard.failure_count += 1;

        match guard.state {
            CircuitState::Open => {
                // Trial call failed: stay open and restart the recovery window.
                guard.opened_at_millis = self.now_millis();
                tracing::warn!(
                    failures = guard.failure_count,
                    "circuit breaker: trial call failed, reopening"
                );
            }
            CircuitState::Closed => {
                if guard.failure_count >= self.config.failure_threshold {
                    guard.state = CircuitState::Open;
                    guard.opened_at_millis = self.now_millis();
                    tracing::error!(
                        failures = guard.failure_count,
                        threshold = self.config.failure_threshold,
                        "circuit breaker → open"
                    );
                }
            }
        }
    }

    fn now_millis(&self) -> u64 {
        self.clock.now_millis()
    }
}
