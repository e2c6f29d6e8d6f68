use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{EventSink, OutboundEvent};

const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(200);

/// Background worker draining the outbound queue.
pub struct EventDispatcher {
    sinks: Vec<Arc<dyn EventSink>>,
    max_attempts: u32,
    base_delay: Duration,
}

impl EventDispatcher {
    pub fn new(sinks: Vec<Arc<dyn EventSink>>, max_attempts: u32) -> Self {
        Self {
            sinks,
            max_attempts: max_attempts.max(1),
            base_delay: DEFAULT_BASE_DELAY,
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Run until every publisher is dropped.
    pub fn spawn(self, rx: mpsc::Receiver<OutboundEvent>) -> JoinHandle<()> {
        tokio::spawn(self.run(rx))
    }

    pub async fn run(self, mut rx: mpsc::Receiver<OutboundEvent>) {
        tracing::info!(sinks = self.sinks.len(), "Event dispatcher started");
        while let Some(event) = rx.recv().await {
            self.dispatch(&event).await;
        }
        tracing::info!("Event dispatcher stopped");
    }

    /// Deliver one event to every sink. Sinks are independent: one failing does not stop
    /// the others.
    pub async fn dispatch(&self, event: &OutboundEvent) {
        let deliveries = self
            .sinks
            .iter()
            .map(|sink| self.deliver_with_retry(sink.as_ref(), event));
        futures::future::join_all(deliveries).await;
    }

    async fn deliver_with_retry(&self, sink: &dyn EventSink, event: &OutboundEvent) -> bool {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match sink.deliver(event).await {
                Ok(()) => {
                    tracing::debug!(sink = sink.name(), event = event.name(), attempt, "Event delivered");
                    return true;
                }
                Err(e) if attempt >= self.max_attempts => {
                    tracing::error!(
                        sink = sink.name(),
                        event = event.name(),
                        attempts = attempt,
                        error = %e,
                        "Event delivery failed, giving up"
                    );
                    return false;
                }
                Err(e) => {
                    let delay = self.base_delay * 2u32.saturating_pow(attempt - 1);
                    tracing::warn!(
                        sink = sink.name(),
                        event = event.name(),
                        attempt,
                        retry_in_ms = delay.as_millis() as u64,
                        error = %e,
                        "Event delivery failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
