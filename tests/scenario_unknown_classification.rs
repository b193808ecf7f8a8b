//! An unclassifiable probe result on any channel must leave the committed state
//! untouched and must not reach the actuator at all.

mod common;

use region_failover::monitor::fakes::{
    FakeBgpProbe, FakeHealthProbe, FakeRouteAdvertiser, FakeTransitPriorityClient,
};
use region_failover::telemetry::{MemorySink, NonBlockingSink};
use region_failover::{Controller, Health, StateCode};
use std::sync::Arc;

#[tokio::test]
async fn an_unknown_probe_result_blocks_any_state_change_and_writes() {
    let mut config = common::test_config();
    config.health_check_window = 1;
    config.health_check_threshold = 1;

    let health = Arc::new(FakeHealthProbe::new(Health::Healthy));
    let bgp = Arc::new(FakeBgpProbe::new(Health::Healthy));
    let advertiser = Arc::new(FakeRouteAdvertiser::new());
    let priority = Arc::new(FakeTransitPriorityClient::new());
    let sink = NonBlockingSink::spawn(MemorySink::new(), 1_000);

    let mut controller =
        Controller::new(&config, health.clone(), bgp, advertiser.clone(), priority.clone(), sink);

    let warmup = controller.tick("unknown-warmup".to_string()).await;
    assert_eq!(warmup.committed_state, StateCode::new(1));
    let calls_after_warmup = advertiser.calls().len();
    let priority_calls_after_warmup = priority.calls().len();
    assert!(calls_after_warmup > 0);
    assert!(priority_calls_after_warmup > 0);

    // An unclassified probe error (e.g. an HTTP status the classifier doesn't
    // recognize) surfaces as Health::Unknown, not a guess at healthy/unhealthy.
    health.set("us-west1", Health::Unknown);

    let summary = controller.tick("unknown-tick".to_string()).await;
    assert_eq!(summary.committed_state, StateCode::new(1), "any UNKNOWN channel must not move the state");

    // No actuation at all runs for this tick: the call count must not have grown.
    assert_eq!(advertiser.calls().len(), calls_after_warmup, "unknown classification must skip the actuator entirely");
    assert_eq!(priority.calls().len(), priority_calls_after_warmup, "unknown classification must skip the actuator entirely");

    // Recovering clears the unknown state and resumes normal operation.
    health.set("us-west1", Health::Healthy);
    let recovered = controller.tick("unknown-recovered".to_string()).await;
    assert_eq!(recovered.committed_state, StateCode::new(1));
}
