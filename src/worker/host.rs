use async_trait::async_trait;
use thiserror::Error;

use super::payload::DisplayedNotification;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Platform call failed: {0}")]
    Platform(String),

    #[error("Window {0} is no longer available")]
    WindowGone(String),
}

/// An open window controlled (or controllable) by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowClient {
    pub id: String,
    pub url: String,
}

/// Platform calls available to the service worker.
#[async_trait]
pub trait WorkerHost: Send + Sync {
    /// Origin the worker is registered on, e.g. `https://shop.example`.
    fn origin(&self) -> &str;

    async fn skip_waiting(&self) -> Result<(), WorkerError>;

    async fn claim_clients(&self) -> Result<(), WorkerError>;

    async fn show_notification(&self, notification: &DisplayedNotification) -> Result<(), WorkerError>;

    async fn close_notification(&self, notification: &DisplayedNotification);

    /// All window clients, including ones not yet controlled by this worker.
    async fn window_clients(&self) -> Result<Vec<WindowClient>, WorkerError>;

    async fn focus(&self, client: &WindowClient) -> Result<(), WorkerError>;

    async fn navigate(&self, client: &WindowClient, url: &str) -> Result<(), WorkerError>;

    async fn open_window(&self, url: &str) -> Result<(), WorkerError>;
}
