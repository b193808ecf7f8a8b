//! Fixed-period scheduler that drives a [`Controller`] tick by tick until cancelled.
//!
//! Correlation ids are generated once per tick in the form `hc-<epoch_seconds>-<suffix>`
//! so every event emitted during a tick can be joined back to it in a log pipeline.

use crate::controller::Controller;
use crate::sleeper::Sleeper;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationReason {
    /// A SIGINT/SIGTERM-equivalent shutdown signal was received.
    Signal,
}

fn correlation_id(epoch_seconds: u64) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    format!("hc-{epoch_seconds}-{suffix}")
}

fn epoch_seconds() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Runs `controller` on a fixed `check_interval` period, sleeping via `sleeper` between
/// ticks, until `shutdown` resolves. A signal arriving while a tick is actuating is
/// observed only at the next sleep boundary: the in-flight tick always completes.
pub async fn run<S, F>(
    controller: &mut Controller,
    check_interval: Duration,
    sleeper: &S,
    shutdown: F,
) -> CancellationReason
where
    S: Sleeper,
    F: std::future::Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        let id = correlation_id(epoch_seconds());
        controller.tick(id).await;

        tokio::select! {
            _ = &mut shutdown => return CancellationReason::Signal,
            _ = sleeper.sleep(check_interval) => {}
        }
    }
}

/// Resolves when the process receives an interrupt or terminate signal. On platforms
/// without a distinct terminate signal (non-Unix), only interrupt is observed.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = sigint.recv() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
