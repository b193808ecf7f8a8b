#![forbid(unsafe_code)]

//! # Transit Failover Controller
//!
//! A control-plane daemon that watches backend, remote-region, and BGP session
//! health, smooths the raw signal through a three-layer flap-protection pipeline,
//! and drives GCP route advertisements and Cloudflare transit priority to keep
//! traffic on a healthy path.
//!
//! ## Pipeline
//!
//! - **Resilience substrate**: [`timeout`], [`retry`], [`circuit_breaker`] wrap
//!   every outbound call to the monitoring and actuation APIs.
//! - **Classification**: [`health`] produces a tri-valued signal per channel;
//!   [`hysteresis`] smooths it over a sliding window; [`state`] reduces the three
//!   smoothed signals into one of seven named states.
//! - **Flap protection**: [`verification`] requires consecutive agreement before
//!   committing an unstable state; [`dwell`] enforces a minimum time between
//!   commits, with an exception set that bypasses it.
//! - **Actuation**: [`plan`] maps a committed state to a deterministic set of BGP
//!   and transit-priority actions; [`monitor`] defines the capability traits that
//!   carry them out; [`actuator`] applies a plan, honoring passive mode.
//! - **Orchestration**: [`controller`] sequences one tick of the pipeline;
//!   [`control_loop`] runs it on a fixed period; [`telemetry`] emits structured
//!   events for every decision point; [`config`] loads everything from the
//!   environment once at startup.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use region_failover::{Backoff, Jitter, ResilienceError, RetryPolicy, TimeoutPolicy};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ResilienceError<std::io::Error>> {
//!     let retry = RetryPolicy::builder()
//!         .max_attempts(3)
//!         .expect("max_attempts > 0")
//!         .backoff(Backoff::exponential(Duration::from_millis(200)))
//!         .with_jitter(Jitter::half_additive())
//!         .build();
//!     let timeout = TimeoutPolicy::new(Duration::from_secs(2)).expect("valid timeout");
//!
//!     let result = timeout
//!         .execute(|| retry.execute(|| async { Ok::<_, ResilienceError<std::io::Error>>(42) }))
//!         .await?;
//!     assert_eq!(result, 42);
//!     Ok(())
//! }
//! ```

mod actuator;
mod backoff;
mod circuit_breaker;
mod clock;
mod config;
mod control_loop;
mod controller;
mod dwell;
mod error;
mod health;
mod hysteresis;
mod jitter;
pub mod monitor;
mod plan;
mod retry;
mod sleeper;
mod state;
pub mod telemetry;
mod timeout;
mod verification;

// Re-exports
pub use actuator::{actuate, ActuationOutcome};
pub use backoff::Backoff;
pub use circuit_breaker::{CircuitBreakerConfig, CircuitBreakerPolicy, CircuitState};
pub use clock::{Clock, MonotonicClock};
pub use config::{Config, ConfigError, Topology};
pub use control_loop::{run, shutdown_signal, CancellationReason};
pub use controller::{Controller, TickSummary};
pub use dwell::{DwellGate, DwellOutcome};
pub use error::ResilienceError;
pub use health::{Health, RawObservation};
pub use hysteresis::{HysteresisMode, HysteresisWindow};
pub use jitter::Jitter;
pub use plan::{plan_for, ActionPlan, TransitPriority};
pub use retry::{BuildError, RetryPolicy, RetryPolicyBuilder};
pub use sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper};
pub use state::{reduce, SmoothedObservation, StateCode};
pub use timeout::{TimeoutError, TimeoutPolicy, MAX_TIMEOUT};
pub use verification::{VerificationGate, VerificationOutcome};

pub mod prelude;
