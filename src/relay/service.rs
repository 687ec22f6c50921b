//! Relay service: credentials, validation and the single provider call.

use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info, warn};

use super::credentials::CredentialsSource;
use super::models::NotificationRequest;
use super::provider::{PushError, PushProvider};
use crate::server::metrics::{record_provider_call, record_relay_outcome};

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("missing configuration: {}", .0.join(", "))]
    MissingConfiguration(Vec<String>),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Provider(#[from] PushError),
}

impl RelayError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::MissingConfiguration(_) => "missing_configuration",
            RelayError::InvalidRequest(_) => "invalid_request",
            RelayError::Provider(_) => "provider",
        }
    }
}

/// Bridges admin notification requests to the push provider.
pub struct RelayService {
    provider: Arc<dyn PushProvider>,
    credentials: CredentialsSource,
}

impl RelayService {
    pub fn new(provider: Arc<dyn PushProvider>, credentials: CredentialsSource) -> Self {
        Self {
            provider,
            credentials,
        }
    }

    /// Relay one request. At most one provider call is made.
    ///
    /// Credentials are checked before the request itself, so a misconfigured
    /// deployment reports the configuration problem first.
    pub async fn relay(
        &self,
        request: &NotificationRequest,
    ) -> Result<serde_json::Value, RelayError> {
        let result = self.relay_inner(request).await;
        match &result {
            Ok(_) => record_relay_outcome("success"),
            Err(e) => {
                record_relay_outcome(e.kind());
                match e {
                    RelayError::Provider(_) => error!("Push relay failed: {}", e),
                    _ => warn!("Push relay rejected request: {}", e),
                }
            }
        }
        result
    }

    async fn relay_inner(
        &self,
        request: &NotificationRequest,
    ) -> Result<serde_json::Value, RelayError> {
        let credentials = self.credentials.resolve()?;
        let notification = request.validate()?;

        info!(
            provider = self.provider.name(),
            segment = %notification.segment,
            "Relaying push notification"
        );

        let start = Instant::now();
        let result = self
            .provider
            .send_notification(&credentials, &notification)
            .await;
        record_provider_call(self.provider.name(), result.is_ok(), start.elapsed());

        Ok(result?)
    }
}
