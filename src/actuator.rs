//! Actuator (§4.10): applies an [`ActionPlan`] via the monitor-client write
//! interfaces, honoring passive mode.

use crate::config::Topology;
use crate::monitor::{RouteAdvertiser, TransitPriorityClient, WriteOutcome};
use crate::plan::ActionPlan;
use crate::telemetry::OperationResult;
use std::time::{Duration, Instant};

/// One write attempt's outcome plus how long the call took, for event emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteAttempt {
    pub result: OperationResult,
    pub duration: Duration,
}

impl From<WriteOutcome> for OperationResult {
    fn from(outcome: WriteOutcome) -> Self {
        match outcome {
            WriteOutcome::Success => OperationResult::Success,
            WriteOutcome::NoChange => OperationResult::NoChange,
            WriteOutcome::Failure => OperationResult::Failure,
        }
    }
}

/// Per-operation results of one actuation pass. `None` means the plan carried no
/// instruction for that operation (state 0's three-way null plan): the write
/// endpoint was never called, and nothing is reported for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActuationOutcome {
    pub primary: Option<WriteAttempt>,
    pub secondary: Option<WriteAttempt>,
    pub priority: Option<WriteAttempt>,
}

async fn timed<T, Fut>(call: impl FnOnce() -> Fut) -> (T, Duration)
where
    Fut: std::future::Future<Output = T>,
{
    let start = Instant::now();
    let result = call().await;
    (result, start.elapsed())
}

/// Apply `plan`. In passive mode every instructed operation reports `Skipped` with a
/// zero duration and no write call is issued; reads upstream of the actuator (health,
/// bgp probes) are unaffected by this flag. Each of the three operations is
/// independent: a failure in one does not prevent the others from running.
pub async fn actuate(
    plan: &ActionPlan,
    topology: &Topology,
    run_passive: bool,
    advertiser: &dyn RouteAdvertiser,
    priority_client: &dyn TransitPriorityClient,
) -> ActuationOutcome {
    let primary = match plan.advertise_primary {
        None => None,
        Some(_) if run_passive => {
            Some(WriteAttempt { result: OperationResult::Skipped, duration: Duration::ZERO })
        }
        Some(desired) => {
            let (outcome, duration) = timed(|| {
                advertiser.advertise(
                    &topology.local_bgp_region,
                    &topology.local_bgp_router,
                    &topology.primary_prefix,
                    desired,
                )
            })
            .await;
            Some(WriteAttempt { result: outcome.into(), duration })
        }
    };

    let secondary = match plan.advertise_secondary {
        None => None,
        Some(_) if run_passive => {
            Some(WriteAttempt { result: OperationResult::Skipped, duration: Duration::ZERO })
        }
        Some(desired) => {
            let (outcome, duration) = timed(|| {
                advertiser.advertise(
                    &topology.local_bgp_region,
                    &topology.local_bgp_router,
                    &topology.secondary_prefix,
                    desired,
                )
            })
            .await;
            Some(WriteAttempt { result: outcome.into(), duration })
        }
    };

    let priority = match plan.transit_priority {
        None => None,
        Some(_) if run_passive => {
            Some(WriteAttempt { result: OperationResult::Skipped, duration: Duration::ZERO })
        }
        Some(priority) => {
            let (outcome, duration) = timed(|| {
                priority_client.set_priority(
                    &topology.cloudflare_account_id,
                    &topology.description_substring,
                    priority,
                )
            })
            .await;
            Some(WriteAttempt { result: outcome.into(), duration })
        }
    };

    ActuationOutcome { primary, secondary, priority }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::fakes::{FakeRouteAdvertiser, FakeTransitPriorityClient};
    use crate::plan::{plan_for, TransitPriority};
    use crate::state::StateCode;

    fn topology() -> Topology {
        Topology {
            local_gcp_region: "us-east1".into(),
            remote_gcp_region: "us-west1".into(),
            local_bgp_router: "router-a".into(),
            remote_bgp_router: "router-b".into(),
            local_bgp_region: "us-east1".into(),
            remote_bgp_region: "us-west1".into(),
            bgp_peer_project: "peer-proj".into(),
            gcp_project: "proj".into(),
            primary_prefix: "10.0.0.0/24".into(),
            secondary_prefix: "10.0.1.0/24".into(),
            description_substring: "failover".into(),
            cloudflare_primary_priority: "100".into(),
            cloudflare_secondary_priority: "200".into(),
            cloudflare_account_id: "acct".into(),
            cloudflare_api_token: "token".into(),
            gcp_monitor_base_url: "https://monitor.test".into(),
            cloudflare_api_base_url: "https://cf.test".into(),
        }
    }

    #[tokio::test]
    async fn state_zero_issues_no_calls_at_all() {
        let advertiser = FakeRouteAdvertiser::new();
        let priority_client = FakeTransitPriorityClient::new();
        let plan = plan_for(StateCode::new(0));

        let outcome =
            actuate(&plan, &topology(), false, &advertiser, &priority_client).await;

        assert_eq!(outcome, ActuationOutcome::default());
        assert!(advertiser.calls().is_empty());
        assert!(priority_client.calls().is_empty());
    }

    #[tokio::test]
    async fn passive_mode_skips_every_instructed_write() {
        let advertiser = FakeRouteAdvertiser::new();
        let priority_client = FakeTransitPriorityClient::new();
        let plan = plan_for(StateCode::new(1));

        let outcome = actuate(&plan, &topology(), true, &advertiser, &priority_client).await;

        assert_eq!(outcome.primary.unwrap().result, OperationResult::Skipped);
        assert_eq!(outcome.secondary.unwrap().result, OperationResult::Skipped);
        assert_eq!(outcome.priority.unwrap().result, OperationResult::Skipped);
        assert!(advertiser.calls().is_empty());
        assert!(priority_client.calls().is_empty());
    }

    #[tokio::test]
    async fn active_mode_issues_every_instructed_write() {
        let advertiser = FakeRouteAdvertiser::new();
        let priority_client = FakeTransitPriorityClient::new();
        let plan = plan_for(StateCode::new(3));

        let outcome = actuate(&plan, &topology(), false, &advertiser, &priority_client).await;

        assert_eq!(outcome.primary.unwrap().result, OperationResult::Success);
        assert_eq!(outcome.secondary.unwrap().result, OperationResult::Success);
        assert_eq!(outcome.priority.unwrap().result, OperationResult::Success);
        assert_eq!(advertiser.calls().len(), 2);
        assert_eq!(priority_client.calls()[0].priority, TransitPriority::Primary);
    }

    #[tokio::test]
    async fn one_write_failing_does_not_cancel_the_others() {
        let advertiser = FakeRouteAdvertiser::new();
        let priority_client = FakeTransitPriorityClient::new();
        advertiser.fail_next_call();
        let plan = plan_for(StateCode::new(3));

        let outcome = actuate(&plan, &topology(), false, &advertiser, &priority_client).await;

        assert_eq!(outcome.primary.unwrap().result, OperationResult::Failure);
        assert_eq!(outcome.secondary.unwrap().result, OperationResult::Success);
        assert_eq!(outcome.priority.unwrap().result, OperationResult::Success);
    }
}
