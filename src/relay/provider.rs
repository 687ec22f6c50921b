//! Push provider trait definition.

use async_trait::async_trait;
use thiserror::Error;

use super::credentials::ProviderCredentials;
use super::models::ValidatedNotification;

/// Errors that can occur when talking to the push delivery provider.
#[derive(Debug, Error)]
pub enum PushError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Provider error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Provider request timeout")]
    Timeout,
}

/// A third-party push delivery service.
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Provider name, used in logs and metrics.
    fn name(&self) -> &str;

    /// Deliver a notification to every device in the target segment.
    ///
    /// Returns the provider's response body.
    async fn send_notification(
        &self,
        credentials: &ProviderCredentials,
        notification: &ValidatedNotification,
    ) -> Result<serde_json::Value, PushError>;
}
