//! Shared fixtures for the scenario tests replaying the pipeline's documented
//! behavior end to end against in-memory monitor fakes.

use region_failover::{Clock, Config, Topology};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A clock whose `now_millis()` is set explicitly, so dwell-time tests don't need to
/// sleep for real.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// A config matching the documented defaults: 5-tick symmetric hysteresis window with
/// a 3-of-5 threshold, a verification threshold of 2 for states 2/3/4, a 120s minimum
/// dwell time, and states 1 and 4 exempted from dwell.
pub fn test_config() -> Config {
    Config {
        check_interval: Duration::from_secs(60),
        max_retries_health_check: 5,
        max_retries_bgp_check: 4,
        max_retries_bgp_update: 2,
        max_retries_cloudflare: 3,
        initial_backoff: Duration::from_secs(1),
        max_backoff: Duration::from_secs(60),
        circuit_breaker_threshold: 5,
        circuit_breaker_timeout: Duration::from_secs(300),
        health_check_window: 5,
        health_check_threshold: 3,
        asymmetric_hysteresis: false,
        state_verification_thresholds: HashMap::from([(2, 2), (3, 2), (4, 2)]),
        min_state_dwell_time: Duration::from_secs(120),
        dwell_time_exception_states: vec![
            region_failover::StateCode::new(1),
            region_failover::StateCode::new(4),
        ],
        run_passive: false,
        gcp_api_timeout: Duration::from_secs(30),
        gcp_backend_health_timeout: Duration::from_secs(45),
        gcp_bgp_operation_timeout: Duration::from_secs(60),
        cloudflare_api_timeout: Duration::from_secs(10),
        cloudflare_bulk_timeout: Duration::from_secs(60),
        topology: Topology {
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
        },
    }
}

/// Drives `n` ticks of uniformly healthy observations through `controller` so its
/// hysteresis windows warm up and state 1 commits, matching every scenario's starting
/// point. Returns after the tick where commitment first happens (tick 5, window
/// capacity).
pub async fn warm_up_to_state_one(
    controller: &mut region_failover::Controller,
    correlation_prefix: &str,
) {
    for i in 0..5 {
        controller.tick(format!("{correlation_prefix}-warmup-{i}")).await;
    }
    assert_eq!(controller.committed_state(), region_failover::StateCode::new(1));
}
