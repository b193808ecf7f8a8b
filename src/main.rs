//! Process entrypoint: load configuration, wire the monitor clients and telemetry
//! sink, and run the control loop until a shutdown signal arrives.

use region_failover::monitor::http::HttpMonitorClient;
use region_failover::monitor::HttpError;
use region_failover::telemetry::{LogSink, NonBlockingSink};
use region_failover::{
    shutdown_signal, Backoff, CircuitBreakerConfig, CircuitBreakerPolicy, Config, Controller,
    Jitter, RetryPolicy, TimeoutPolicy, TokioSleeper,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn build_retry(max_attempts: usize) -> RetryPolicy<HttpError> {
    RetryPolicy::builder()
        .max_attempts(max_attempts.max(1))
        .expect("max_attempts > 0")
        .backoff(Backoff::exponential(std::time::Duration::from_secs(1)).with_max(std::time::Duration::from_secs(60)))
        .with_jitter(Jitter::half_additive())
        .with_sleeper(TokioSleeper)
        .should_retry(|e: &HttpError| e.is_retryable())
        .build()
}

fn build_breaker(config: &Config) -> CircuitBreakerPolicy {
    CircuitBreakerPolicy::with_config(CircuitBreakerConfig {
        failure_threshold: config.circuit_breaker_threshold,
        recovery_timeout: config.circuit_breaker_timeout,
    })
}

fn gcp_client(config: &Config) -> HttpMonitorClient {
    HttpMonitorClient::new(
        config.topology.gcp_monitor_base_url.clone(),
        std::env::var("GCP_MONITOR_TOKEN").unwrap_or_default(),
        TimeoutPolicy::new(config.gcp_backend_health_timeout).expect("valid GCP probe timeout"),
        build_retry(config.max_retries_health_check.max(config.max_retries_bgp_check)),
        build_breaker(config),
        TimeoutPolicy::new(config.gcp_bgp_operation_timeout).expect("valid GCP write timeout"),
        build_retry(config.max_retries_bgp_update),
        build_breaker(config),
    )
}

fn cloudflare_client(config: &Config) -> HttpMonitorClient {
    HttpMonitorClient::new(
        config.topology.cloudflare_api_base_url.clone(),
        config.topology.cloudflare_api_token.clone(),
        TimeoutPolicy::new(config.cloudflare_api_timeout).expect("valid Cloudflare probe timeout"),
        build_retry(config.max_retries_cloudflare),
        build_breaker(config),
        TimeoutPolicy::new(config.cloudflare_bulk_timeout).expect("valid Cloudflare write timeout"),
        build_retry(config.max_retries_cloudflare),
        build_breaker(config),
    )
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    let gcp = Arc::new(gcp_client(&config));
    let cloudflare = Arc::new(cloudflare_client(&config));

    let sink = NonBlockingSink::spawn(LogSink, 1_000);

    let mut controller =
        Controller::new(&config, gcp.clone(), gcp.clone(), gcp.clone(), cloudflare, sink);

    tracing::info!(
        check_interval_secs = config.check_interval.as_secs(),
        run_passive = config.run_passive,
        "starting control loop"
    );

    let reason =
        region_failover::run(&mut controller, config.check_interval, &TokioSleeper, shutdown_signal())
            .await;

    tracing::info!(?reason, "control loop exited");
    std::process::ExitCode::SUCCESS
}
