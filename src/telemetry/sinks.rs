use super::events::Event;
use std::convert::Infallible;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tower_service::Service;

/// A telemetry sink that consumes structured events.
///
/// Modeled on a single-method `tower_service::Service`: sinks are always ready (no
/// backpressure signal is needed for log/metric fan-out), so `emit_best_effort` calls
/// straight through rather than waiting on `poll_ready`.
pub trait TelemetrySink:
    Service<Event, Response = (), Error = Self::SinkError> + Clone + Send + 'static
{
    type SinkError: std::error::Error + Send + 'static;
}

/// Best-effort emit helper: swallows sink errors so a failing sink can never affect
/// the control loop's own outcome.
pub async fn emit_best_effort<S>(mut sink: S, event: Event)
where
    S: Service<Event, Response = ()> + Send + 'static,
    S::Error: std::error::Error + Send + 'static,
    S::Future: Send + 'static,
{
    let _ = sink.call(event).await;
}

/// Discards all events. Used when telemetry is not wired to a real sink.
#[derive(Clone, Debug, Default)]
pub struct NullSink;

impl Service<Event> for NullSink {
    type Response = ();
    type Error = Infallible;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<(), Self::Error>> + Send>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, _event: Event) -> Self::Future {
        Box::pin(async { Ok(()) })
    }
}

impl TelemetrySink for NullSink {
    type SinkError = Infallible;
}

/// Logs each event via `tracing`, one line per event with `event_type` as a field.
#[derive(Clone, Debug, Default)]
pub struct LogSink;

impl Service<Event> for LogSink {
    type Response = ();
    type Error = Infallible;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<(), Self::Error>> + Send>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: Event) -> Self::Future {
        let epoch_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let json = super::events::event_to_json(&event, epoch_ms);
        tracing::info!(event_type = event.event_type(), payload = %json, "policy_event");
        Box::pin(async { Ok(()) })
    }
}

impl TelemetrySink for LogSink {
    type SinkError = Infallible;
}

/// Stores events in memory, evicting the oldest when full. Used by tests to assert on
/// emitted events without a real logging backend.
#[derive(Clone, Debug)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<Event>>>,
    capacity: usize,
    evicted: Arc<AtomicU64>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::with_capacity(10_000)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            capacity: capacity.max(1),
            evicted: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().expect("memory sink mutex poisoned").clone()
    }

    pub fn clear(&self) {
        self.events.lock().expect("memory sink mutex poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.events.lock().expect("memory sink mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().expect("memory sink mutex poisoned").is_empty()
    }

    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Event> for MemorySink {
    type Response = ();
    type Error = Infallible;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<(), Self::Error>> + Send>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: Event) -> Self::Future {
        let mut guard = self.events.lock().expect("memory sink mutex poisoned");
        if guard.len() >= self.capacity {
            guard.remove(0);
            self.evicted.fetch_add(1, Ordering::Relaxed);
        }
        guard.push(event);
        Box::pin(async { Ok(()) })
    }
}

impl TelemetrySink for MemorySink {
    type SinkError = Infallible;
}

/// Offloads emission to a bounded channel and background task; a full channel drops
/// the event rather than block the control loop, per §4.12's non-blocking requirement.
#[derive(Clone)]
pub struct NonBlockingSink {
    tx: tokio::sync::mpsc::Sender<Event>,
    dropped: Arc<AtomicU64>,
}

impl NonBlockingSink {
    pub fn spawn<S>(sink: S, capacity: usize) -> Self
    where
        S: Service<Event, Response = ()> + Send + 'static,
        S::Error: std::error::Error + Send + 'static,
        S::Future: Send + 'static,
    {
        let (tx, mut rx) = tokio::sync::mpsc::channel(capacity);
        let dropped = Arc::new(AtomicU64::new(0));

        tokio::spawn(async move {
            let mut sink = sink;
            while let Some(event) = rx.recv().await {
                let _ = sink.call(event).await;
            }
        });

        Self { tx, dropped }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Service<Event> for NonBlockingSink {
    type Response = ();
    type Error = Infallible;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<(), Self::Error>> + Send>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: Event) -> Self::Future {
        if self.tx.try_send(event).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        Box::pin(async { Ok(()) })
    }
}

impl TelemetrySink for NonBlockingSink {
    type SinkError = Infallible;
}
