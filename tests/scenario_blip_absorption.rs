//! A single unhealthy observation sandwiched between healthy ones must not flip the
//! committed state, and idempotent re-actuation against an unchanged plan must settle
//! into `NoChange` writes.

mod common;

use region_failover::monitor::fakes::{
    FakeBgpProbe, FakeHealthProbe, FakeRouteAdvertiser, FakeTransitPriorityClient,
};
use region_failover::telemetry::{Event, MemorySink, NonBlockingSink, OperationResult};
use region_failover::{Controller, Health, StateCode};
use std::sync::Arc;
use std::time::Duration;

fn bgp_advertisement_results(events: &[Event]) -> Vec<OperationResult> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::BgpAdvertisementChange { prefix, result, .. } if prefix == "10.0.0.0/24" => {
                Some(*result)
            }
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn transient_blip_is_absorbed_by_hysteresis() {
    let health = Arc::new(FakeHealthProbe::new(Health::Healthy));
    let bgp = Arc::new(FakeBgpProbe::new(Health::Healthy));
    let advertiser = Arc::new(FakeRouteAdvertiser::new());
    let priority = Arc::new(FakeTransitPriorityClient::new());
    let memory = MemorySink::new();
    let sink = NonBlockingSink::spawn(memory.clone(), 1_000);

    let mut controller =
        Controller::new(&common::test_config(), health.clone(), bgp, advertiser, priority, sink);

    common::warm_up_to_state_one(&mut controller, "blip").await;

    for i in 0..2 {
        health.set("us-east1", Health::Healthy);
        let summary = controller.tick(format!("blip-steady-{i}")).await;
        assert_eq!(summary.committed_state, StateCode::new(1));
    }

    health.set("us-east1", Health::Unhealthy);
    let summary = controller.tick("blip-dip".to_string()).await;
    assert_eq!(summary.committed_state, StateCode::new(1), "single blip must not flip committed state");

    health.set("us-east1", Health::Healthy);
    let summary = controller.tick("blip-recover".to_string()).await;
    assert_eq!(summary.committed_state, StateCode::new(1));

    // Let the background sink drain before inspecting recorded events.
    tokio::time::sleep(Duration::from_millis(20)).await;

    let results = bgp_advertisement_results(&memory.events());
    assert_eq!(results.first(), Some(&OperationResult::Success), "the warm-up commit must write once");
    assert!(
        results[1..].iter().all(|r| *r == OperationResult::NoChange),
        "every later re-actuation of the same plan must report NoChange, got {results:?}"
    );
}
