//! Controller: owns cross-tick memory and sequences one tick of the pipeline
//! (§4.11, §5, §9's "single owning controller value" design note).
//!
//! Hysteresis windows, the verification gate, and the committed-state record persist
//! across ticks for the lifetime of the process; everything else here is recomputed
//! fresh each tick and discarded.

use crate::actuator::{actuate, ActuationOutcome};
use crate::clock::{Clock, MonotonicClock};
use crate::config::{Config, Topology};
use crate::dwell::{DwellGate, DwellOutcome};
use crate::health::{Health, RawObservation};
use crate::hysteresis::{HysteresisMode, HysteresisWindow};
use crate::monitor::{BackendHealthProbe, BgpSessionProbe, RouteAdvertiser, TransitPriorityClient};
use crate::plan::{plan_for, TransitPriority};
use crate::state::{reduce, SmoothedObservation, StateCode};
use crate::telemetry::{
    Channel, Event, NonBlockingSink, OperationResult, OperationResults, StateTransitionReason,
};
use crate::verification::{VerificationGate, VerificationOutcome};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_service::Service;

/// Summary of one completed tick, for the control loop's own logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    pub committed_state: StateCode,
    pub duration: Duration,
}

pub struct Controller {
    topology: Topology,
    run_passive: bool,

    hysteresis_local: HysteresisWindow,
    hysteresis_remote: HysteresisWindow,
    hysteresis_bgp: HysteresisWindow,

    verification: VerificationGate,
    dwell: DwellGate,

    committed_state: StateCode,
    committed_since: u64,
    clock: Arc<dyn Clock>,

    health_probe: Arc<dyn BackendHealthProbe>,
    bgp_probe: Arc<dyn BgpSessionProbe>,
    advertiser: Arc<dyn RouteAdvertiser>,
    priority_client: Arc<dyn TransitPriorityClient>,

    sink: NonBlockingSink,
}

impl Controller {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: &Config,
        health_probe: Arc<dyn BackendHealthProbe>,
        bgp_probe: Arc<dyn BgpSessionProbe>,
        advertiser: Arc<dyn RouteAdvertiser>,
        priority_client: Arc<dyn TransitPriorityClient>,
        sink: NonBlockingSink,
    ) -> Self {
        let mode = if config.asymmetric_hysteresis {
            HysteresisMode::Asymmetric
        } else {
            HysteresisMode::Symmetric { threshold: config.health_check_threshold }
        };

        let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::default());

        Self {
            topology: config.topology.clone(),
            run_passive: config.run_passive,
            hysteresis_local: HysteresisWindow::new(config.health_check_window, mode),
            hysteresis_remote: HysteresisWindow::new(config.health_check_window, mode),
            hysteresis_bgp: HysteresisWindow::new(config.health_check_window, mode),
            verification: VerificationGate::new(config.state_verification_thresholds.clone()),
            dwell: DwellGate::new(config.min_state_dwell_time, config.dwell_time_exception_states.clone()),
            committed_state: StateCode::UNKNOWN,
            committed_since: clock.now_millis(),
            clock,
            health_probe,
            bgp_probe,
            advertiser,
            priority_client,
            sink,
        }
    }

    /// Override the clock driving dwell-time bookkeeping (useful for deterministic tests).
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self.committed_since = self.clock.now_millis();
        self
    }

    async fn emit(&mut self, event: Event) {
        let _ = self.sink.call(event).await;
    }

    /// Run one tick: probe, classify, gate, actuate, emit. Never returns an error —
    /// probe and write failures are absorbed into `Health::Unknown` / per-operation
    /// `FAILURE` results per §7, not surfaced here.
    pub async fn tick(&mut self, correlation_id: String) -> TickSummary {
        let start = Instant::now();

        let (local, remote, bgp) = tokio::join!(
            self.health_probe.probe(&self.topology.local_gcp_region),
            self.health_probe.probe(&self.topology.remote_gcp_region),
            self.bgp_probe.bgp(&self.topology.local_bgp_region, &self.topology.local_bgp_router),
        );

        for (channel, health, region_or_router) in [
            (Channel::Local, local, self.topology.local_gcp_region.clone()),
            (Channel::Remote, remote, self.topology.remote_gcp_region.clone()),
            (Channel::Bgp, bgp, self.topology.local_bgp_router.clone()),
        ] {
            self.emit(Event::HealthCheckResult {
                correlation_id: correlation_id.clone(),
                channel,
                health,
                region_or_router,
            })
            .await;
        }

        let observation = RawObservation { local, remote, bgp };

        if observation.any_unknown() {
            self.emit(Event::HealthCheckCycle {
                correlation_id,
                duration: start.elapsed(),
                result: OperationResult::NoChange,
                passive_mode: self.run_passive,
                operation_results: OperationResults::default(),
            })
            .await;
            return TickSummary { committed_state: self.committed_state, duration: start.elapsed() };
        }

        let smoothed = SmoothedObservation {
            local_healthy: self.hysteresis_local.observe(local.as_bool().expect("known")),
            remote_healthy: self.hysteresis_remote.observe(remote.as_bool().expect("known")),
            bgp_up: self.hysteresis_bgp.observe(bgp.as_bool().expect("known")),
        };
        let raw_state = reduce(smoothed);

        let verification = self.verification.evaluate(raw_state, self.committed_state);

        if let VerificationOutcome::Pending { .. } = verification {
            self.emit(Event::StateTransition {
                correlation_id: correlation_id.clone(),
                from_state: self.committed_state.value(),
                to_state: raw_state.value(),
                result: OperationResult::NoChange,
                reason: StateTransitionReason::PendingVerification,
            })
            .await;

            let outcome = self.apply_plan(self.committed_state).await;
            self.emit_cycle(
                correlation_id,
                start.elapsed(),
                OperationResult::NoChange,
                self.committed_state,
                &outcome,
            )
            .await;
            return TickSummary { committed_state: self.committed_state, duration: start.elapsed() };
        }

        if raw_state != self.committed_state {
            let now = self.clock.now_millis();
            let elapsed = Duration::from_millis(now.saturating_sub(self.committed_since));
            match self.dwell.evaluate(self.committed_state, raw_state, elapsed) {
                DwellOutcome::Blocked => {
                    self.emit(Event::StateTransition {
                        correlation_id: correlation_id.clone(),
                        from_state: self.committed_state.value(),
                        to_state: raw_state.value(),
                        result: OperationResult::NoChange,
                        reason: StateTransitionReason::DwellBlocked,
                    })
                    .await;
                }
                DwellOutcome::Commit { exception_bypass } => {
                    let reason = if exception_bypass {
                        StateTransitionReason::ExceptionBypass
                    } else {
                        StateTransitionReason::Committed
                    };
                    self.emit(Event::StateTransition {
                        correlation_id: correlation_id.clone(),
                        from_state: self.committed_state.value(),
                        to_state: raw_state.value(),
                        result: OperationResult::Success,
                        reason,
                    })
                    .await;
                    self.committed_state = raw_state;
                    self.committed_since = now;
                }
            }
        } else {
            self.emit(Event::StateTransition {
                correlation_id: correlation_id.clone(),
                from_state: self.committed_state.value(),
                to_state: raw_state.value(),
                result: OperationResult::NoChange,
                reason: StateTransitionReason::NoOpSameState,
            })
            .await;
        }

        let outcome = self.apply_plan(self.committed_state).await;
        self.emit_cycle(correlation_id, start.elapsed(), OperationResult::Success, self.committed_state, &outcome)
            .await;

        TickSummary { committed_state: self.committed_state, duration: start.elapsed() }
    }

    async fn apply_plan(&self, state: StateCode) -> ActuationOutcome {
        let plan = plan_for(state);
        actuate(&plan, &self.topology, self.run_passive, self.advertiser.as_ref(), self.priority_client.as_ref())
            .await
    }

    async fn emit_cycle(
        &mut self,
        correlation_id: String,
        duration: Duration,
        result: OperationResult,
        state: StateCode,
        outcome: &ActuationOutcome,
    ) {
        let plan = plan_for(state);

        let bgp_updates_skipped = [outcome.primary, outcome.secondary]
            .iter()
            .filter(|a| matches!(a, Some(w) if w.result == OperationResult::Skipped))
            .count() as u32;
        let cloudflare_updates_skipped =
            matches!(outcome.priority, Some(w) if w.result == OperationResult::Skipped) as u32;

        if let Some(write) = outcome.primary {
            self.emit(Event::BgpAdvertisementChange {
                correlation_id: correlation_id.clone(),
                duration: write.duration,
                result: write.result,
                region: self.topology.local_bgp_region.clone(),
                router: self.topology.local_bgp_router.clone(),
                prefix: self.topology.primary_prefix.clone(),
                desired: plan.advertise_primary,
            })
            .await;
        }
        if let Some(write) = outcome.secondary {
            self.emit(Event::BgpAdvertisementChange {
                correlation_id: correlation_id.clone(),
                duration: write.duration,
                result: write.result,
                region: self.topology.local_bgp_region.clone(),
                router: self.topology.local_bgp_router.clone(),
                prefix: self.topology.secondary_prefix.clone(),
                desired: plan.advertise_secondary,
            })
            .await;
        }
        if let Some(write) = outcome.priority {
            let priority = match plan.transit_priority {
                Some(TransitPriority::Secondary) => self.topology.cloudflare_secondary_priority.clone(),
                _ => self.topology.cloudflare_primary_priority.clone(),
            };
            self.emit(Event::CloudflareRouteUpdate {
                correlation_id: correlation_id.clone(),
                duration: write.duration,
                result: write.result,
                selector: self.topology.description_substring.clone(),
                priority,
            })
            .await;
        }

        self.emit(Event::HealthCheckCycle {
            correlation_id,
            duration,
            result,
            passive_mode: self.run_passive,
            operation_results: OperationResults { bgp_updates_skipped, cloudflare_updates_skipped },
        })
        .await;
    }

    pub fn committed_state(&self) -> StateCode {
        self.committed_state
    }
}
