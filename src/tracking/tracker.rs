use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::models::{BrowserSignal, DeviceProbe, EventType, InteractionEvent, PageContext};
use super::sink::AnalyticsSink;
use crate::server::metrics::record_tracking_event;
use crate::session::{ensure_session_id, generate_session_id, LocalStore};

#[derive(Debug, Clone)]
pub struct TrackerSettings {
    /// Events waiting for the sink beyond this are dropped.
    pub queue_capacity: usize,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
        }
    }
}

/// Fire-and-forget interaction tracker.
///
/// `track` only snapshots and enqueues. A background task owns the sink and
/// submits events in order; failures are logged and never retried.
pub struct InteractionTracker {
    sender: mpsc::Sender<InteractionEvent>,
    drain_task: JoinHandle<()>,
    session_id: String,
    probe: Arc<dyn DeviceProbe>,
    page: PageContext,
}

impl InteractionTracker {
    /// Start the tracker and its drain task. Must be called inside a Tokio runtime.
    ///
    /// The session id is read (or created) here, once, so `track` never
    /// touches the store.
    pub fn start(
        sink: Arc<dyn AnalyticsSink>,
        store: Arc<dyn LocalStore>,
        probe: Arc<dyn DeviceProbe>,
        page: PageContext,
        settings: TrackerSettings,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(settings.queue_capacity.max(1));
        let drain_task = tokio::spawn(drain(receiver, sink));

        Self {
            sender,
            drain_task,
            session_id: resolve_session_id(store.as_ref()),
            probe,
            page,
        }
    }

    /// Enqueue one event. Returns false if it was dropped.
    pub fn track(&self, event_type: EventType) -> bool {
        let event = InteractionEvent {
            session_id: self.session_id.clone(),
            event_type,
            device_info: self.probe.snapshot(),
            page_url: self.page.page_url.clone(),
            referrer: self.page.referrer.clone(),
            created_at: chrono::Utc::now(),
        };

        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!("Tracking queue full, dropping {} event", event_type.as_str());
                record_tracking_event(event_type.as_str(), "dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(
                    "Tracking queue closed, dropping {} event",
                    event_type.as_str()
                );
                record_tracking_event(event_type.as_str(), "dropped");
                false
            }
        }
    }

    /// Track a page load: always a visit, plus an app open when installed.
    pub fn track_launch(&self) {
        self.track(EventType::Visit);
        if self.probe.snapshot().standalone {
            self.track(EventType::AppOpen);
        }
    }

    /// Track one occurrence of a browser lifecycle signal.
    pub fn on_signal(&self, signal: BrowserSignal) -> bool {
        self.track(signal.event_type())
    }

    /// Stop accepting events and wait for the queued ones to be submitted.
    pub async fn shutdown(self) {
        drop(self.sender);
        if let Err(e) = self.drain_task.await {
            warn!("Tracking drain task ended abnormally: {}", e);
        }
    }
}

fn resolve_session_id(store: &dyn LocalStore) -> String {
    match ensure_session_id(store) {
        Ok(id) => id,
        Err(e) => {
            // Tracking still goes out, just without a stable id.
            warn!("Failed to persist session id: {}", e);
            generate_session_id()
        }
    }
}

async fn drain(mut receiver: mpsc::Receiver<InteractionEvent>, sink: Arc<dyn AnalyticsSink>) {
    while let Some(event) = receiver.recv().await {
        let event_type = event.event_type.as_str();
        match sink.record(&event).await {
            Ok(()) => record_tracking_event(event_type, "sent"),
            Err(e) => {
                warn!("Failed to record {} event: {}", event_type, e);
                record_tracking_event(event_type, "failed");
            }
        }
    }
    debug!("Tracking queue drained");
}
