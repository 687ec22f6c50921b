//! Analytics sinks.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use super::models::InteractionEvent;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Sink rejected event (status {status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Destination of tracked interaction events.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn record(&self, event: &InteractionEvent) -> Result<(), SinkError>;
}

/// Inserts events as rows through a PostgREST-style table endpoint.
pub struct RestAnalyticsSink {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl RestAnalyticsSink {
    /// Create a sink writing into `table`.
    ///
    /// # Arguments
    /// * `base_url` - Project URL (e.g., "https://project.supabase.co")
    /// * `table` - Table receiving one row per event
    /// * `api_key` - Public (anon) key allowed to insert into the table
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(
        base_url: &str,
        table: &str,
        api_key: impl Into<String>,
        timeout_sec: u64,
    ) -> Result<Self, SinkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .map_err(|e| SinkError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        let endpoint = format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table);

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnalyticsSink for RestAnalyticsSink {
    async fn record(&self, event: &InteractionEvent) -> Result<(), SinkError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(event)
            .send()
            .await
            .map_err(|e| SinkError::Connection(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        Err(SinkError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
