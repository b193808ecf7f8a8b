//! Convenient re-exports for the most commonly used types.
pub use crate::{
    actuate, plan_for, reduce, run, shutdown_signal, ActionPlan, ActuationOutcome, Backoff,
    CancellationReason, CircuitBreakerConfig, CircuitBreakerPolicy, CircuitState, Clock, Config,
    ConfigError, Controller, DwellGate, DwellOutcome, Health, HysteresisMode, HysteresisWindow,
    InstantSleeper, Jitter, MonotonicClock, RawObservation, ResilienceError, RetryPolicy,
    RetryPolicyBuilder, Sleeper, SmoothedObservation, StateCode, TickSummary, TimeoutError,
    TimeoutPolicy, TokioSleeper, Topology, TrackingSleeper, TransitPriority, VerificationGate,
    VerificationOutcome,
};
pub use crate::monitor::{
    BackendHealthProbe, BgpSessionProbe, HttpError, RouteAdvertiser, TransitPriorityClient,
    WriteOutcome,
};
pub use crate::telemetry::{
    Channel, CircuitTransition, Event, LogSink, MemorySink, NonBlockingSink, NullSink,
    OperationResult, OperationResults, StateTransitionReason, TelemetrySink,
};
