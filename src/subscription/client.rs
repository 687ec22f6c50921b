use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Push client is not available")]
    Unavailable,

    #[error("Push client error: {0}")]
    Provider(String),
}

/// Options passed to the provider's client library on init.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub app_id: String,
    /// Locale of the provider's own prompts.
    pub locale: String,
    /// Let the library run on `http://localhost` during development.
    pub allow_localhost_as_secure_origin: bool,
}

impl ClientOptions {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            locale: "ar".to_string(),
            allow_localhost_as_secure_origin: true,
        }
    }
}

/// The provider's client library as seen from the page.
#[async_trait]
pub trait PushClient: Send + Sync {
    async fn init(&self, options: &ClientOptions) -> Result<(), ClientError>;

    /// Whether this device currently holds an active subscription.
    async fn is_subscribed(&self) -> Result<bool, ClientError>;

    /// Show the native permission prompt. Returns whether it was granted.
    async fn request_permission(&self) -> Result<bool, ClientError>;

    /// Drop this device's subscription.
    async fn opt_out(&self) -> Result<(), ClientError>;

    /// Subscription changes pushed by the provider.
    fn subscription_changes(&self) -> broadcast::Receiver<bool>;
}

/// Handle to a client library that may finish loading after the page starts.
#[derive(Clone, Default)]
pub struct ClientSlot {
    inner: Arc<RwLock<Option<Arc<dyn PushClient>>>>,
}

impl ClientSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called by whoever loads the library once it is ready.
    pub fn install(&self, client: Arc<dyn PushClient>) {
        *self.inner.write().unwrap() = Some(client);
    }

    pub fn get(&self) -> Option<Arc<dyn PushClient>> {
        self.inner.read().unwrap().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.read().unwrap().is_some()
    }
}
