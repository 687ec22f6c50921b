use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::client::{ClientOptions, ClientSlot, PushClient};
use super::feedback::{Notice, UserFeedback};
use crate::poll::poll_until;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubscriptionStatus {
    /// The provider has not answered yet.
    Loading,
    Subscribed,
    NotSubscribed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscriptionSnapshot {
    pub status: SubscriptionStatus,
    pub initialized: bool,
}

impl SubscriptionSnapshot {
    pub fn is_subscribed(&self) -> bool {
        self.status == SubscriptionStatus::Subscribed
    }
}

#[derive(Debug, Clone)]
pub struct InitSettings {
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
}

impl Default for InitSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            poll_timeout: Duration::from_secs(10),
        }
    }
}

fn subscribed_status(subscribed: bool) -> SubscriptionStatus {
    if subscribed {
        SubscriptionStatus::Subscribed
    } else {
        SubscriptionStatus::NotSubscribed
    }
}

/// Tracks this device's push subscription and exposes the opt-in/opt-out
/// actions to the UI.
///
/// Every user-initiated action ends in a [`Notice`]; none of them returns an
/// error to the caller.
pub struct SubscriptionManager {
    slot: ClientSlot,
    options: ClientOptions,
    settings: InitSettings,
    feedback: Arc<dyn UserFeedback>,
    client: RwLock<Option<Arc<dyn PushClient>>>,
    state: Arc<watch::Sender<SubscriptionSnapshot>>,
    listener: Mutex<Option<JoinHandle<()>>>,
    /// Held for the whole init sequence so overlapping callers init once.
    init_lock: tokio::sync::Mutex<()>,
}

impl SubscriptionManager {
    pub fn new(
        slot: ClientSlot,
        options: ClientOptions,
        settings: InitSettings,
        feedback: Arc<dyn UserFeedback>,
    ) -> Self {
        let (state, _) = watch::channel(SubscriptionSnapshot {
            status: SubscriptionStatus::Loading,
            initialized: false,
        });
        Self {
            slot,
            options,
            settings,
            feedback,
            client: RwLock::new(None),
            state: Arc::new(state),
            listener: Mutex::new(None),
            init_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> SubscriptionSnapshot {
        *self.state.borrow()
    }

    /// Receiver notified on every state change.
    pub fn watch(&self) -> watch::Receiver<SubscriptionSnapshot> {
        self.state.subscribe()
    }

    fn client(&self) -> Option<Arc<dyn PushClient>> {
        self.client.read().unwrap().clone()
    }

    fn publish(&self, status: SubscriptionStatus) {
        self.state.send_replace(SubscriptionSnapshot {
            status,
            initialized: true,
        });
    }

    /// Wait for the client library, configure it and load the current status.
    ///
    /// Gives up after the poll timeout and reports "not subscribed" rather
    /// than blocking. Calling it again after success is a no-op, also while
    /// another call is still in progress.
    pub async fn initialize(&self) {
        let _init = self.init_lock.lock().await;
        if self.client().is_some() {
            return;
        }

        let slot = self.slot.clone();
        let client = poll_until(self.settings.poll_interval, self.settings.poll_timeout, || {
            let slot = slot.clone();
            async move { slot.get() }
        })
        .await;

        let Some(client) = client else {
            warn!(
                "Push client did not load within {:?}, assuming not subscribed",
                self.settings.poll_timeout
            );
            self.publish(SubscriptionStatus::NotSubscribed);
            return;
        };

        if let Err(e) = client.init(&self.options).await {
            warn!("Push client init failed: {}", e);
            self.publish(SubscriptionStatus::NotSubscribed);
            return;
        }

        // Subscribe before querying so no change slips in between.
        let changes = client.subscription_changes();

        let status = match client.is_subscribed().await {
            Ok(subscribed) => subscribed_status(subscribed),
            Err(e) => {
                warn!("Failed to query subscription status: {}", e);
                SubscriptionStatus::NotSubscribed
            }
        };
        info!("Push subscription status: {:?}", status);

        *self.client.write().unwrap() = Some(client);
        self.publish(status);

        let handle = tokio::spawn(listen_for_changes(changes, self.state.clone()));
        if let Some(previous) = self.listener.lock().unwrap().replace(handle) {
            previous.abort();
        }
    }

    /// Prompt for notification permission. Returns whether it was granted.
    pub async fn request_permission(&self) -> bool {
        let Some(client) = self.client() else {
            self.feedback.notify(Notice::error(
                "الإشعارات غير متاحة",
                "لم يتم تحميل خدمة الإشعارات بعد، حاول مرة أخرى لاحقاً",
            ));
            return false;
        };

        match client.request_permission().await {
            Ok(true) => {
                self.publish(SubscriptionStatus::Subscribed);
                self.feedback.notify(Notice::success(
                    "تم تفعيل الإشعارات",
                    "ستصلك أحدث العروض والمنتجات",
                ));
                true
            }
            Ok(false) => {
                self.feedback.notify(Notice::error(
                    "لم يتم تفعيل الإشعارات",
                    "يمكنك السماح بالإشعارات من إعدادات المتصفح",
                ));
                false
            }
            Err(e) => {
                warn!("Permission request failed: {}", e);
                self.feedback.notify(Notice::error(
                    "حدث خطأ",
                    "تعذر تفعيل الإشعارات، حاول مرة أخرى",
                ));
                false
            }
        }
    }

    /// Opt this device out of push notifications. Returns whether it worked.
    pub async fn unsubscribe(&self) -> bool {
        let Some(client) = self.client() else {
            self.feedback.notify(Notice::error(
                "الإشعارات غير متاحة",
                "لم يتم تحميل خدمة الإشعارات بعد، حاول مرة أخرى لاحقاً",
            ));
            return false;
        };

        match client.opt_out().await {
            Ok(()) => {
                self.publish(SubscriptionStatus::NotSubscribed);
                self.feedback.notify(Notice::success(
                    "تم إيقاف الإشعارات",
                    "لن تصلك إشعارات بعد الآن",
                ));
                true
            }
            Err(e) => {
                warn!("Opt-out failed: {}", e);
                self.feedback.notify(Notice::error(
                    "حدث خطأ",
                    "تعذر إيقاف الإشعارات، حاول مرة أخرى",
                ));
                false
            }
        }
    }
}

impl Drop for SubscriptionManager {
    fn drop(&mut self) {
        if let Some(handle) = self.listener.lock().unwrap().take() {
            handle.abort();
        }
    }
}

async fn listen_for_changes(
    mut changes: broadcast::Receiver<bool>,
    state: Arc<watch::Sender<SubscriptionSnapshot>>,
) {
    loop {
        match changes.recv().await {
            Ok(subscribed) => {
                debug!("Provider reported subscription change: {}", subscribed);
                state.send_replace(SubscriptionSnapshot {
                    status: subscribed_status(subscribed),
                    initialized: true,
                });
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!("Missed {} subscription change events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
