//! Generic `reqwest`-based monitor client.
//!
//! Stands in for the vendor backend/BGP/DNS SDKs this daemon doesn't depend on
//! directly: every call is a plain JSON HTTP request, resilience-wrapped with the
//! same timeout → retry → circuit-breaker stack every other external call in this
//! crate uses. Vendor
//! authentication, request shaping, and response schemas are intentionally generic;
//! a production deployment would swap this module for real SDK bindings without
//! touching the pipeline above it.

use super::{classify_status, BackendHealthProbe, BgpSessionProbe, HttpError, RouteAdvertiser, TransitPriorityClient, WriteOutcome};
use crate::circuit_breaker::CircuitBreakerPolicy;
use crate::health::Health;
use crate::plan::TransitPriority;
use crate::retry::RetryPolicy;
use crate::timeout::TimeoutPolicy;
use crate::ResilienceError;
use async_trait::async_trait;
use reqwest::Client;

/// Runs `call` under a per-category timeout, converting a timeout into
/// `ResilienceError::Inner(HttpError::Timeout)` so the retry engine's Inner-only
/// retry path treats it as transient, per the convention documented in `retry.rs`.
async fn with_timeout<T, Fut, Op>(
    timeout: &TimeoutPolicy,
    call: Op,
) -> Result<T, ResilienceError<HttpError>>
where
    T: Send,
    Fut: std::future::Future<Output = Result<T, ResilienceError<HttpError>>> + Send,
    Op: FnOnce() -> Fut + Send,
{
    match timeout.execute(call).await {
        Err(ResilienceError::Timeout { elapsed, timeout }) => {
            Err(ResilienceError::Inner(HttpError::Timeout { elapsed, timeout }))
        }
        other => other,
    }
}

/// Bundles the three resilience layers used around every outbound call.
#[derive(Clone)]
struct ResilienceStack {
    timeout: TimeoutPolicy,
    retry: RetryPolicy<HttpError>,
    breaker: CircuitBreakerPolicy,
}

impl ResilienceStack {
    fn new(timeout: TimeoutPolicy, retry: RetryPolicy<HttpError>, breaker: CircuitBreakerPolicy) -> Self {
        Self { timeout, retry, breaker }
    }

    async fn run<T, Fut, Op>(&self, call: Op) -> Result<T, ResilienceError<HttpError>>
    where
        T: Send,
        Fut: std::future::Future<Output = Result<T, ResilienceError<HttpError>>> + Send,
        Op: FnMut() -> Fut + Send,
    {
        let timeout = self.timeout;
        let retry = self.retry.clone();
        self.breaker
            .execute(move || async move {
                let mut call = call;
                retry.execute(move || with_timeout(&timeout, &mut call)).await
            })
            .await
    }
}

async fn send_json(request: reqwest::RequestBuilder) -> Result<serde_json::Value, ResilienceError<HttpError>> {
    let response = request.send().await.map_err(|e| {
        ResilienceError::Inner(HttpError::Transport { message: e.to_string() })
    })?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ResilienceError::Inner(classify_status(status.as_u16(), body)));
    }
    response
        .json::<serde_json::Value>()
        .await
        .map_err(|e| ResilienceError::Inner(HttpError::Transport { message: e.to_string() }))
}

/// Generic HTTP-backed implementation of all four monitor-client traits, hitting a
/// single base URL with bearer-token auth.
pub struct HttpMonitorClient {
    client: Client,
    base_url: String,
    token: String,
    probe_stack: ResilienceStack,
    write_stack: ResilienceStack,
}

impl HttpMonitorClient {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        probe_timeout: TimeoutPolicy,
        probe_retry: RetryPolicy<HttpError>,
        probe_breaker: CircuitBreakerPolicy,
        write_timeout: TimeoutPolicy,
        write_retry: RetryPolicy<HttpError>,
        write_breaker: CircuitBreakerPolicy,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token: token.into(),
            probe_stack: ResilienceStack::new(probe_timeout, probe_retry, probe_breaker),
            write_stack: ResilienceStack::new(write_timeout, write_retry, write_breaker),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Result<serde_json::Value, ResilienceError<HttpError>> {
        let client = self.client.clone();
        let url = self.url(path);
        let token = self.token.clone();
        self.probe_stack
            .run(move || {
                let client = client.clone();
                let url = url.clone();
                let token = token.clone();
                async move { send_json(client.get(&url).bearer_auth(&token)).await }
            })
            .await
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<serde_json::Value, ResilienceError<HttpError>> {
        let client = self.client.clone();
        let url = self.url(path);
        let token = self.token.clone();
        self.write_stack
            .run(move || {
                let client = client.clone();
                let url = url.clone();
                let token = token.clone();
                let body = body.clone();
                async move { send_json(client.post(&url).bearer_auth(&token).json(&body)).await }
            })
            .await
    }
}

/// Every backend in the response must report `"status": "healthy"` for the region to
/// classify as healthy; any `"unhealthy"` entry classifies it unhealthy. A transport,
/// transient, or unclassified error yields `Unknown` without being silently dropped —
/// it is logged by the resilience stack's own tracing spans before reaching here.
fn classify_backend_response(body: &serde_json::Value) -> Health {
    let backends = match body.get("backends").and_then(|v| v.as_array()) {
        Some(b) => b,
        None => return Health::Unknown,
    };
    if backends.is_empty() {
        return Health::Unknown;
    }
    let statuses: Vec<&str> =
        backends.iter().filter_map(|b| b.get("status").and_then(|s| s.as_str())).collect();
    if statuses.len() != backends.len() {
        return Health::Unknown;
    }
    if statuses.iter().all(|s| *s == "healthy") {
        Health::Healthy
    } else if statuses.iter().any(|s| *s == "unhealthy") {
        Health::Unhealthy
    } else {
        Health::Unknown
    }
}

fn classify_bgp_response(body: &serde_json::Value) -> Health {
    let sessions = match body.get("sessions").and_then(|v| v.as_array()) {
        Some(s) => s,
        None => return Health::Unknown,
    };
    if sessions.is_empty() {
        return Health::Unknown;
    }
    let states: Vec<&str> =
        sessions.iter().filter_map(|s| s.get("state").and_then(|s| s.as_str())).collect();
    if states.len() != sessions.len() {
        return Health::Unknown;
    }
    if states.iter().any(|s| *s == "down") {
        Health::Unhealthy
    } else if states.iter().all(|s| *s == "up") {
        Health::Healthy
    } else {
        Health::Unknown
    }
}

#[async_trait]
impl BackendHealthProbe for HttpMonitorClient {
    async fn probe(&self, region: &str) -> Health {
        match self.get(&format!("/regions/{region}/backends")).await {
            Ok(body) => classify_backend_response(&body),
            Err(_) => Health::Unknown,
        }
    }
}

#[async_trait]
impl BgpSessionProbe for HttpMonitorClient {
    async fn bgp(&self, region: &str, router: &str) -> Health {
        match self.get(&format!("/regions/{region}/routers/{router}/bgp-sessions")).await {
            Ok(body) => classify_bgp_response(&body),
            Err(_) => Health::Unknown,
        }
    }
}

#[async_trait]
impl RouteAdvertiser for HttpMonitorClient {
    async fn advertise(&self, region: &str, router: &str, prefix: &str, desired: bool) -> WriteOutcome {
        let path = format!("/regions/{region}/routers/{router}/advertisements");
        let body = serde_json::json!({ "prefix": prefix, "advertise": desired });
        match self.post(&path, body).await {
            Ok(response) => match response.get("changed").and_then(|v| v.as_bool()) {
                Some(true) => WriteOutcome::Success,
                Some(false) => WriteOutcome::NoChange,
                None => WriteOutcome::Success,
            },
            Err(_) => WriteOutcome::Failure,
        }
    }
}

#[async_trait]
impl TransitPriorityClient for HttpMonitorClient {
    async fn set_priority(&self, account: &str, selector: &str, priority: TransitPriority) -> WriteOutcome {
        let path = format!("/accounts/{account}/routes/priority");
        let body = serde_json::json!({ "selector": selector, "priority": priority.to_string() });
        match self.post(&path, body).await {
            Ok(response) => match response.get("changed").and_then(|v| v.as_bool()) {
                Some(true) => WriteOutcome::Success,
                Some(false) => WriteOutcome::NoChange,
                None => WriteOutcome::Success,
            },
            Err(_) => WriteOutcome::Failure,
        }
    }
}
