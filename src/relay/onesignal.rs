//! OneSignal REST client.
//!
//! Only the "create notification" endpoint is used, targeting segments.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

use super::credentials::ProviderCredentials;
use super::models::ValidatedNotification;
use super::provider::{PushError, PushProvider};

pub const ONESIGNAL_API_BASE: &str = "https://onesignal.com/api/v1";

const IOS_SOUND: &str = "notification.wav";
const ANDROID_SOUND: &str = "notification";
const VIEW_SITE_BUTTON_ID: &str = "view-site";
const VIEW_SITE_BUTTON_TEXT: &str = "عرض الموقع";

#[derive(Debug, Serialize, PartialEq)]
struct WebButton {
    id: String,
    text: String,
    url: String,
}

#[derive(Debug, Serialize)]
struct CreateNotificationBody<'a> {
    app_id: &'a str,
    included_segments: Vec<&'a str>,
    headings: BTreeMap<&'static str, &'a str>,
    contents: BTreeMap<&'static str, &'a str>,
    ios_sound: &'static str,
    android_sound: &'static str,
    url: &'a str,
    web_buttons: Vec<WebButton>,
}

fn localized(text: &str) -> BTreeMap<&'static str, &str> {
    BTreeMap::from([("en", text), ("ar", text)])
}

/// HTTP client for the OneSignal notifications API.
pub struct OneSignalClient {
    client: Client,
    base_url: String,
    site_url: String,
}

impl OneSignalClient {
    /// Create a new OneSignal client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the API (e.g., "https://onesignal.com/api/v1")
    /// * `site_url` - URL opened by the "view site" button
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(
        base_url: impl Into<String>,
        site_url: impl Into<String>,
        timeout_sec: u64,
    ) -> Result<Self, PushError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .map_err(|e| PushError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            site_url: site_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_body<'a>(
        &'a self,
        credentials: &'a ProviderCredentials,
        notification: &'a ValidatedNotification,
    ) -> CreateNotificationBody<'a> {
        CreateNotificationBody {
            app_id: &credentials.app_id,
            included_segments: vec![notification.segment.as_str()],
            headings: localized(&notification.title),
            contents: localized(&notification.message),
            ios_sound: IOS_SOUND,
            android_sound: ANDROID_SOUND,
            url: &self.site_url,
            web_buttons: vec![WebButton {
                id: VIEW_SITE_BUTTON_ID.to_string(),
                text: VIEW_SITE_BUTTON_TEXT.to_string(),
                url: self.site_url.clone(),
            }],
        }
    }
}

fn map_transport_error(err: reqwest::Error) -> PushError {
    if err.is_timeout() {
        PushError::Timeout
    } else {
        PushError::Connection(err.to_string())
    }
}

/// Pull a readable message out of an error body, e.g. `{"errors": ["..."]}`.
fn error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    match parsed.as_ref().and_then(|v| v.get("errors")) {
        Some(serde_json::Value::Array(errors)) => errors
            .iter()
            .map(|e| e.as_str().map(str::to_string).unwrap_or_else(|| e.to_string()))
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
        None if body.trim().is_empty() => "empty response body".to_string(),
        None => body.trim().to_string(),
    }
}

#[async_trait]
impl PushProvider for OneSignalClient {
    fn name(&self) -> &str {
        "onesignal"
    }

    async fn send_notification(
        &self,
        credentials: &ProviderCredentials,
        notification: &ValidatedNotification,
    ) -> Result<serde_json::Value, PushError> {
        let url = format!("{}/notifications", self.base_url);
        let body = self.build_body(credentials, notification);

        debug!(segment = %notification.segment, "Sending notification to OneSignal");

        let response = self
            .client
            .post(&url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Basic {}", credentials.api_key),
            )
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            let message = error_message(&text);
            warn!(status = status.as_u16(), %message, "OneSignal rejected notification");
            return Err(PushError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| PushError::InvalidResponse(e.to_string()))
    }
}
