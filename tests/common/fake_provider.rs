//! In-process stand-ins for the push provider and the analytics table API.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// One request received by a fake server.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub headers: HeaderMap,
    pub body: Value,
}

impl RecordedCall {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Clone)]
struct FakeState {
    status: StatusCode,
    body: String,
    delay: Duration,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

async fn record_and_reply(
    State(state): State<FakeState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.calls.lock().unwrap().push(RecordedCall {
        headers,
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    (
        state.status,
        [("content-type", "application/json")],
        state.body.clone(),
    )
        .into_response()
}

/// Fake server answering `POST <route>` with a fixed response.
///
/// Provider fakes listen on `/notifications`, analytics fakes on
/// `/rest/v1/<table>`.
pub struct FakeServer {
    pub base_url: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

pub type FakeProvider = FakeServer;

impl FakeServer {
    /// Provider accepting every notification.
    pub async fn accepting() -> Self {
        Self::provider(
            StatusCode::OK,
            json!({"id": "b98881cc-1e94-4366-bbd9-db8f3429292b", "recipients": 3}).to_string(),
            Duration::ZERO,
        )
        .await
    }

    /// Provider rejecting every notification with the given status and error list.
    pub async fn rejecting(status: StatusCode, errors: &[&str]) -> Self {
        Self::provider(status, json!({ "errors": errors }).to_string(), Duration::ZERO).await
    }

    /// Provider that accepts but answers only after `delay`.
    pub async fn slow(delay: Duration) -> Self {
        Self::provider(StatusCode::OK, json!({"id": "late"}).to_string(), delay).await
    }

    /// Provider answering 200 with a body that is not JSON.
    pub async fn non_json() -> Self {
        Self::provider(
            StatusCode::OK,
            "<html>maintenance</html>".to_string(),
            Duration::ZERO,
        )
        .await
    }

    /// Analytics table endpoint answering every insert with `status`.
    pub async fn analytics(table: &str, status: StatusCode, body: &str) -> Self {
        Self::spawn(
            &format!("/rest/v1/{}", table),
            status,
            body.to_string(),
            Duration::ZERO,
        )
        .await
    }

    async fn provider(status: StatusCode, body: String, delay: Duration) -> Self {
        Self::spawn("/notifications", status, body, delay).await
    }

    async fn spawn(route: &str, status: StatusCode, body: String, delay: Duration) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = FakeState {
            status,
            body,
            delay,
            calls: calls.clone(),
        };
        let app = Router::new()
            .route(route, post(record_and_reply))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake server");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Fake server failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            calls,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Base URL of a local port with nothing listening on it.
pub async fn refused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let port = listener
        .local_addr()
        .expect("Failed to get local address")
        .port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
