//! In-memory monitor clients for tests: scriptable probes and write clients that
//! record every call they receive.

use super::{BackendHealthProbe, BgpSessionProbe, RouteAdvertiser, TransitPriorityClient, WriteOutcome};
use crate::health::Health;
use crate::plan::TransitPriority;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Returns a fixed [`Health`] for every region, or a per-region override.
#[derive(Debug)]
pub struct FakeHealthProbe {
    default: Health,
    overrides: Mutex<HashMap<String, Health>>,
    calls: Mutex<Vec<String>>,
}

impl FakeHealthProbe {
    pub fn new(default: Health) -> Self {
        Self { default, overrides: Mutex::new(HashMap::new()), calls: Mutex::new(Vec::new()) }
    }

    pub fn set(&self, region: &str, health: Health) {
        self.overrides.lock().unwrap().insert(region.to_string(), health);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BackendHealthProbe for FakeHealthProbe {
    async fn probe(&self, region: &str) -> Health {
        self.calls.lock().unwrap().push(region.to_string());
        *self.overrides.lock().unwrap().get(region).unwrap_or(&self.default)
    }
}

/// Returns a fixed [`Health`] for every (region, router) pair, or an override keyed by
/// `"{region}/{router}"`.
#[derive(Debug)]
pub struct FakeBgpProbe {
    default: Health,
    overrides: Mutex<HashMap<String, Health>>,
}

impl FakeBgpProbe {
    pub fn new(default: Health) -> Self {
        Self { default, overrides: Mutex::new(HashMap::new()) }
    }

    pub fn set(&self, region: &str, router: &str, health: Health) {
        self.overrides.lock().unwrap().insert(format!("{region}/{router}"), health);
    }
}

#[async_trait]
impl BgpSessionProbe for FakeBgpProbe {
    async fn bgp(&self, region: &str, router: &str) -> Health {
        let key = format!("{region}/{router}");
        *self.overrides.lock().unwrap().get(&key).unwrap_or(&self.default)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertiseCall {
    pub region: String,
    pub router: String,
    pub prefix: String,
    pub desired: bool,
}

/// Tracks advertised prefixes per (region, router) and returns `NoChange` when the
/// recorded state already matches the desired one, `Success` otherwise.
#[derive(Debug, Default)]
pub struct FakeRouteAdvertiser {
    state: Mutex<HashMap<(String, String, String), bool>>,
    calls: Mutex<Vec<AdvertiseCall>>,
    fail_next: Mutex<bool>,
}

impl FakeRouteAdvertiser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<AdvertiseCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Make the next `advertise` call return `Failure`.
    pub fn fail_next_call(&self) {
        *self.fail_next.lock().unwrap() = true;
    }
}

#[async_trait]
impl RouteAdvertiser for FakeRouteAdvertiser {
    async fn advertise(&self, region: &str, router: &str, prefix: &str, desired: bool) -> WriteOutcome {
        self.calls.lock().unwrap().push(AdvertiseCall {
            region: region.to_string(),
            router: router.to_string(),
            prefix: prefix.to_string(),
            desired,
        });

        if std::mem::take(&mut *self.fail_next.lock().unwrap()) {
            return WriteOutcome::Failure;
        }

        let key = (region.to_string(), router.to_string(), prefix.to_string());
        let mut state = self.state.lock().unwrap();
        if state.get(&key).copied() == Some(desired) {
            return WriteOutcome::NoChange;
        }
        state.insert(key, desired);
        WriteOutcome::Success
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityCall {
    pub account: String,
    pub selector: String,
    pub priority: TransitPriority,
}

/// Tracks the last priority set per (account, selector) and returns `NoChange` when
/// it already matches.
#[derive(Debug, Default)]
pub struct FakeTransitPriorityClient {
    state: Mutex<HashMap<(String, String), TransitPriority>>,
    calls: Mutex<Vec<PriorityCall>>,
    fail_next: Mutex<bool>,
}

impl FakeTransitPriorityClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<PriorityCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_next_call(&self) {
        *self.fail_next.lock().unwrap() = true;
    }
}

#[async_trait]
impl TransitPriorityClient for FakeTransitPriorityClient {
    async fn set_priority(&self, account: &str, selector: &str, priority: TransitPriority) -> WriteOutcome {
        self.calls.lock().unwrap().push(PriorityCall {
            account: account.to_string(),
            selector: selector.to_string(),
            priority,
        });

        if std::mem::take(&mut *self.fail_next.lock().unwrap()) {
            return WriteOutcome::Failure;
        }

        let key = (account.to_string(), selector.to_string());
        let mut state = self.state.lock().unwrap();
        if state.get(&key).copied() == Some(priority) {
            return WriteOutcome::NoChange;
        }
        state.insert(key, priority);
        WriteOutcome::Success
    }
}
