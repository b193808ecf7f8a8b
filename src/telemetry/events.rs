//! Structured event types emitted by the control loop.
//!
//! Every event carries the tick's correlation id and a `result` tag so a JSON-line
//! log can be filtered and aggregated without parsing free-text messages.

use std::fmt;
use std::time::Duration;

/// Outcome of an operation attached to an event, per §4.12 of the event schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationResult {
    Success,
    Failure,
    NoChange,
    Skipped,
}

impl fmt::Display for OperationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationResult::Success => "success",
            OperationResult::Failure => "failure",
            OperationResult::NoChange => "no_change",
            OperationResult::Skipped => "skipped",
        };
        write!(f, "{s}")
    }
}

/// A single monitored channel, used by `health_check_result` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Local,
    Remote,
    Bgp,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Channel::Local => "local",
            Channel::Remote => "remote",
            Channel::Bgp => "bgp",
        };
        write!(f, "{s}")
    }
}

/// Per-cycle summary counters carried by `health_check_cycle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperationResults {
    pub bgp_updates_skipped: u32,
    pub cloudflare_updates_skipped: u32,
}

/// Strongly-typed events emitted by the control loop, actuator and resilience substrate.
///
/// This is the single event taxonomy this crate emits; every variant maps to one of
/// the seven `event_type` values in the external event schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Emitted once per control-loop tick, summarizing the whole cycle.
    HealthCheckCycle {
        correlation_id: String,
        duration: Duration,
        result: OperationResult,
        passive_mode: bool,
        operation_results: OperationResults,
    },
    /// Emitted for each probe result within a tick.
    HealthCheckResult {
        correlation_id: String,
        channel: Channel,
        health: crate::health::Health,
        region_or_router: String,
    },
    /// Emitted whenever the gating pipeline accepts, rejects, or blocks a candidate state.
    StateTransition {
        correlation_id: String,
        from_state: u8,
        to_state: u8,
        result: OperationResult,
        reason: StateTransitionReason,
    },
    /// Emitted for each BGP advertise/withdraw write attempted by the actuator.
    BgpAdvertisementChange {
        correlation_id: String,
        duration: Duration,
        result: OperationResult,
        region: String,
        router: String,
        prefix: String,
        desired: Option<bool>,
    },
    /// Emitted for each transit-priority write attempted by the actuator.
    CloudflareRouteUpdate {
        correlation_id: String,
        duration: Duration,
        result: OperationResult,
        selector: String,
        priority: String,
    },
    /// Emitted on every circuit breaker state change.
    CircuitBreakerEvent {
        correlation_id: String,
        category: String,
        transition: CircuitTransition,
        failure_count: usize,
    },
    /// Emitted for ad-hoc connectivity checks (e.g. a BGP session probe) outside the
    /// per-channel health-check-result stream.
    ConnectivityTest {
        correlation_id: String,
        duration: Duration,
        result: OperationResult,
        target: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTransitionReason {
    Committed,
    PendingVerification,
    DwellBlocked,
    ExceptionBypass,
    NoOpSameState,
}

impl fmt::Display for StateTransitionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StateTransitionReason::Committed => "committed",
            StateTransitionReason::PendingVerification => "pending_verification",
            StateTransitionReason::DwellBlocked => "dwell_blocked",
            StateTransitionReason::ExceptionBypass => "exception_bypass",
            StateTransitionReason::NoOpSameState => "no_op_same_state",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitTransition {
    Opened,
    Closed,
    TrialAdmitted,
    RejectedWhileOpen,
}

impl fmt::Display for CircuitTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CircuitTransition::Opened => "opened",
            CircuitTransition::Closed => "closed",
            CircuitTransition::TrialAdmitted => "trial_admitted",
            CircuitTransition::RejectedWhileOpen => "rejected_while_open",
        };
        write!(f, "{s}")
    }
}

impl Event {
    /// The stable `event_type` discriminant used in the JSON schema.
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::HealthCheckCycle { .. } => "health_check_cycle",
            Event::HealthCheckResult { .. } => "health_check_result",
            Event::StateTransition { .. } => "state_transition",
            Event::BgpAdvertisementChange { .. } => "bgp_advertisement_change",
            Event::CloudflareRouteUpdate { .. } => "cloudflare_route_update",
            Event::CircuitBreakerEvent { .. } => "circuit_breaker_event",
            Event::ConnectivityTest { .. } => "connectivity_test",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Event::HealthCheckCycle { correlation_id, .. }
            | Event::HealthCheckResult { correlation_id, .. }
            | Event::StateTransition { correlation_id, .. }
            | Event::BgpAdvertisementChange { correlation_id, .. }
            | Event::CloudflareRouteUpdate { correlation_id, .. }
            | Event::CircuitBreakerEvent { correlation_id, .. }
            | Event::ConnectivityTest { correlation_id, .. } => correlation_id,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.event_type(), self.correlation_id())
    }
}

/// Convert an event into a JSON value carrying the common fields plus per-type detail.
pub fn event_to_json(event: &Event, timestamp_epoch_ms: u128) -> serde_json::Value {
    use serde_json::json;

    let common = json!({
        "event_type": event.event_type(),
        "correlation_id": event.correlation_id(),
        "timestamp": timestamp_epoch_ms,
    });

    let detail = match event {
        Event::HealthCheckCycle { duration, result, passive_mode, operation_results, .. } => json!({
            "duration_ms": duration.as_millis() as u64,
            "result": result.to_string(),
            "configuration": { "passive_mode": passive_mode },
            "operation_results": {
                "bgp_updates_skipped": operation_results.bgp_updates_skipped,
                "cloudflare_updates_skipped": operation_results.cloudflare_updates_skipped,
            },
        }),
        Event::HealthCheckResult { channel, health, region_or_router, .. } => json!({
            "channel": channel.to_string(),
            "health": health.to_string(),
            "region_or_router": region_or_router,
        }),
        Event::StateTransition { from_state, to_state, result, reason, .. } => json!({
            "from_state": from_state,
            "to_state": to_state,
            "result": result.to_string(),
            "reason": reason.to_string(),
        }),
        Event::BgpAdvertisementChange {
            duration, result, region, router, prefix, desired, ..
        } => json!({
            "duration_ms": duration.as_millis() as u64,
            "result": result.to_string(),
            "region": region,
            "router": router,
            "prefix": prefix,
            "desired": desired,
        }),
        Event::CloudflareRouteUpdate { duration, result, selector, priority, .. } => json!({
            "duration_ms": duration.as_millis() as u64,
            "result": result.to_string(),
            "selector": selector,
            "priority": priority,
        }),
        Event::CircuitBreakerEvent { category, transition, failure_count, .. } => json!({
            "category": category,
            "transition": transition.to_string(),
            "failure_count": failure_count,
        }),
        Event::ConnectivityTest { duration, result, target, .. } => json!({
            "duration_ms": duration.as_millis() as u64,
            "result": result.to_string(),
            "target": target,
        }),
    };

    let mut merged = common;
    if let (Some(m), Some(d)) = (merged.as_object_mut(), detail.as_object()) {
        for (k, v) in d {
            m.insert(k.clone(), v.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::Health;

    #[test]
    fn event_type_matches_schema_names() {
        let e = Event::StateTransition {
            correlation_id: "hc-1-abcdefgh".into(),
            from_state: 1,
            to_state: 4,
            result: OperationResult::Success,
            reason: StateTransitionReason::Committed,
        };
        assert_eq!(e.event_type(), "state_transition");
        assert_eq!(e.correlation_id(), "hc-1-abcdefgh");
    }

    #[test]
    fn json_carries_common_and_detail_fields() {
        let e = Event::HealthCheckResult {
            correlation_id: "hc-2-zzzzzzzz".into(),
            channel: Channel::Local,
            health: Health::Healthy,
            region_or_router: "us-east1".into(),
        };
        let v = event_to_json(&e, 1_700_000_000_000);
        assert_eq!(v["event_type"], "health_check_result");
        assert_eq!(v["channel"], "local");
        assert_eq!(v["health"], "healthy");
        assert_eq!(v["region_or_router"], "us-east1");
        assert_eq!(v["timestamp"], 1_700_000_000_000_u64);
    }

    #[test]
    fn health_check_cycle_carries_nested_operation_results() {
        let e = Event::HealthCheckCycle {
            correlation_id: "hc-3-aaaaaaaa".into(),
            duration: Duration::from_millis(250),
            result: OperationResult::Success,
            passive_mode: true,
            operation_results: OperationResults {
                bgp_updates_skipped: 1,
                cloudflare_updates_skipped: 1,
            },
        };
        let v = event_to_json(&e, 0);
        assert_eq!(v["configuration"]["passive_mode"], true);
        assert_eq!(v["operation_results"]["bgp_updates_skipped"], 1);
    }
}
