use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use super::host::{WindowClient, WorkerError, WorkerHost};
use super::payload::{target_path, DisplayedNotification, PushPayload};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerPhase {
    Installing,
    Waiting,
    Active,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerActivity {
    Idle,
    HandlingPush,
    HandlingClick,
}

/// Messages posted to the worker by its pages.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum WorkerMessage {
    #[serde(rename = "SKIP_WAITING")]
    SkipWaiting,
}

/// Event handlers of the storefront's service worker.
///
/// Handlers never return errors: a failure is logged and the event ends with
/// no notification shown or no window touched.
pub struct ServiceWorker {
    host: Arc<dyn WorkerHost>,
    phase: Mutex<WorkerPhase>,
    activity: Mutex<WorkerActivity>,
}

/// Resets the activity to idle when a handler returns.
struct ActivityGuard<'a>(&'a Mutex<WorkerActivity>);

impl Drop for ActivityGuard<'_> {
    fn drop(&mut self) {
        *self.0.lock().unwrap() = WorkerActivity::Idle;
    }
}

impl ServiceWorker {
    pub fn new(host: Arc<dyn WorkerHost>) -> Self {
        Self {
            host,
            phase: Mutex::new(WorkerPhase::Installing),
            activity: Mutex::new(WorkerActivity::Idle),
        }
    }

    pub fn phase(&self) -> WorkerPhase {
        *self.phase.lock().unwrap()
    }

    pub fn activity(&self) -> WorkerActivity {
        *self.activity.lock().unwrap()
    }

    fn enter(&self, activity: WorkerActivity) -> ActivityGuard<'_> {
        *self.activity.lock().unwrap() = activity;
        ActivityGuard(&self.activity)
    }

    /// New versions do not wait for old tabs to close.
    pub async fn on_install(&self) {
        *self.phase.lock().unwrap() = WorkerPhase::Waiting;
        if let Err(e) = self.host.skip_waiting().await {
            warn!("skip_waiting failed during install: {}", e);
        }
    }

    pub async fn on_activate(&self) {
        if let Err(e) = self.host.claim_clients().await {
            warn!("Failed to claim clients: {}", e);
        }
        *self.phase.lock().unwrap() = WorkerPhase::Active;
        info!("Service worker active");
    }

    pub async fn on_push(&self, data: Option<&[u8]>) {
        let Some(bytes) = data else {
            debug!("Push event without payload, ignoring");
            return;
        };
        let _guard = self.enter(WorkerActivity::HandlingPush);

        let payload = match PushPayload::parse(bytes) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Dropping push with malformed payload: {}", e);
                return;
            }
        };

        let notification = payload.into_notification();
        debug!("Showing notification tagged {}", notification.options.tag);
        if let Err(e) = self.host.show_notification(&notification).await {
            warn!("Failed to show notification: {}", e);
        }
    }

    pub async fn on_notification_click(&self, notification: &DisplayedNotification) {
        let _guard = self.enter(WorkerActivity::HandlingClick);
        self.host.close_notification(notification).await;

        let path = target_path(notification.notification_type());
        if let Err(e) = self.open_target(path).await {
            warn!("Failed to open {} after notification click: {}", path, e);
        }
    }

    async fn open_target(&self, path: &str) -> Result<(), WorkerError> {
        let origin = Url::parse(self.host.origin())
            .map_err(|e| WorkerError::Platform(format!("invalid worker origin: {}", e)))?;
        let target = origin
            .join(path)
            .map_err(|e| WorkerError::Platform(format!("invalid target path: {}", e)))?;

        let clients = self.host.window_clients().await?;
        match clients.iter().find(|client| same_origin(client, &origin)) {
            Some(client) => {
                self.host.focus(client).await?;
                self.host.navigate(client, target.as_str()).await
            }
            None => self.host.open_window(target.as_str()).await,
        }
    }

    pub async fn on_message(&self, message: &Value) {
        match WorkerMessage::deserialize(message) {
            Ok(WorkerMessage::SkipWaiting) => {
                if let Err(e) = self.host.skip_waiting().await {
                    warn!("skip_waiting failed: {}", e);
                }
            }
            Err(_) => debug!("Ignoring worker message: {}", message),
        }
    }
}

fn same_origin(client: &WindowClient, origin: &Url) -> bool {
    Url::parse(&client.url)
        .map(|url| url.origin() == origin.origin())
        .unwrap_or(false)
}
