//! Observability for the failover daemon.
//!
//! Every tick, gate decision, and actuation write emits a strongly-typed [`events::Event`]
//! through a [`sinks::TelemetrySink`]. Sinks never block the control loop: a full
//! channel drops the event rather than stall a tick (see [`sinks::NonBlockingSink`]).

pub mod events;
pub mod sinks;

pub use events::{
    Channel, CircuitTransition, Event, OperationResult, OperationResults, StateTransitionReason,
};
pub use sinks::{emit_best_effort, LogSink, MemorySink, NonBlockingSink, NullSink, TelemetrySink};
