//! Service-worker notification lifecycle: install/activate, turning push
//! payloads into system notifications and routing clicks back to the site.

mod host;
mod lifecycle;
mod payload;

pub use host::{WindowClient, WorkerError, WorkerHost};
pub use lifecycle::{ServiceWorker, WorkerActivity, WorkerPhase};
pub use payload::{
    target_path, DisplayedNotification, NotificationAction, NotificationOptions, PushPayload,
    DEFAULT_TAG, FALLBACK_ICON,
};
