//! HTTP client for end-to-end tests
//!
//! When routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    pub base_url: String,
    bearer: Option<String>,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            bearer: None,
        }
    }

    /// Client sending `Authorization: Bearer <token>` on relay calls.
    pub fn with_token(base_url: String, token: &str) -> Self {
        Self {
            bearer: Some(token.to_string()),
            ..Self::new(base_url)
        }
    }

    pub async fn send_push(&self, title: &str, message: &str, segment: Option<&str>) -> Response {
        let mut body = json!({ "title": title, "message": message });
        if let Some(segment) = segment {
            body["segment"] = json!(segment);
        }
        self.send_push_json(&body).await
    }

    pub async fn send_push_json(&self, body: &Value) -> Response {
        let mut request = self
            .client
            .post(format!("{}/send-push", self.base_url))
            .json(body);
        if let Some(token) = &self.bearer {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("send-push request failed")
    }

    pub async fn send_push_raw(&self, body: &'static str) -> Response {
        self.client
            .post(format!("{}/send-push", self.base_url))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("send-push request failed")
    }

    pub async fn preflight(&self) -> Response {
        self.client
            .request(
                reqwest::Method::OPTIONS,
                format!("{}/send-push", self.base_url),
            )
            .header("origin", "https://admin.example")
            .header("access-control-request-method", "POST")
            .send()
            .await
            .expect("preflight request failed")
    }

    pub async fn health(&self) -> Response {
        self.client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .expect("health request failed")
    }
}
