use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tracing::{info, warn};

use super::{cors_headers, log_requests, metrics, preflight, state::*, ServerConfig};
use crate::relay::{NotificationRequest, RelayResponse};

#[derive(Serialize)]
struct HealthResponse {
    pub uptime: String,
    pub version: &'static str,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn health(State(state): State<ServerState>) -> impl IntoResponse {
    Json(HealthResponse {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn failure(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(RelayResponse::failure(error))).into_response()
}

fn is_authorized(config: &ServerConfig, headers: &HeaderMap) -> bool {
    let Some(expected) = config.relay_token.as_deref() else {
        return true;
    };
    let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    // Auth schemes are case-insensitive.
    match value.trim().split_once(' ') {
        Some((scheme, token)) => {
            scheme.eq_ignore_ascii_case("bearer") && token.trim() == expected.trim()
        }
        None => false,
    }
}

async fn send_push(
    State(config): State<ServerConfig>,
    State(relay): State<GuardedRelayService>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !is_authorized(&config, &headers) {
        warn!("Rejected send-push request without a valid relay token");
        return failure(StatusCode::UNAUTHORIZED, "unauthorized");
    }

    // Parsed by hand so a malformed body still gets the relay envelope.
    let request: NotificationRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Malformed send-push body: {}", e);
            return failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("invalid request body: {}", e),
            );
        }
    };

    match relay.relay(&request).await {
        Ok(data) => (StatusCode::OK, Json(RelayResponse::success(data))).into_response(),
        Err(e) => failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

pub fn make_app(config: ServerConfig, relay: GuardedRelayService) -> Router {
    let state = ServerState {
        config,
        start_time: Instant::now(),
        relay,
    };

    Router::new()
        .route("/send-push", axum::routing::post(send_push).options(preflight))
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(cors_headers))
                .layer(middleware::from_fn_with_state(state.clone(), log_requests)),
        )
        .with_state(state)
}

fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics::metrics_handler))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

pub async fn run_server(config: ServerConfig, relay: GuardedRelayService) -> Result<()> {
    let port = config.port;
    let metrics_port = config.metrics_port;
    let app = make_app(config, relay);

    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(metrics_listener, make_metrics_app()).await {
            warn!("Metrics server stopped: {}", e);
        }
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::{
        CredentialsSource, ProviderCredentials, PushError, PushProvider, RelayService,
        ValidatedNotification,
    };
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PushProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        async fn send_notification(
            &self,
            _credentials: &ProviderCredentials,
            notification: &ValidatedNotification,
        ) -> Result<serde_json::Value, PushError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::json!({
                "id": "abc",
                "recipients": 3,
                "segment": notification.segment,
            }))
        }
    }

    fn make_test_app(
        relay_token: Option<&str>,
        credentials: CredentialsSource,
    ) -> (Router, Arc<CountingProvider>) {
        let provider = Arc::new(CountingProvider::default());
        let relay = Arc::new(RelayService::new(provider.clone(), credentials));
        let config = ServerConfig {
            requests_logging_level: super::super::RequestsLoggingLevel::None,
            relay_token: relay_token.map(str::to_string),
            ..Default::default()
        };
        (make_app(config, relay), provider)
    }

    fn configured() -> CredentialsSource {
        CredentialsSource::Static {
            app_id: Some("app".to_string()),
            api_key: Some("key".to_string()),
        }
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/send-push")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 00:00:00");
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "1d 01:01:01");
    }

    #[tokio::test]
    async fn preflight_returns_empty_204_with_cors_headers() {
        let (app, provider) = make_test_app(None, configured());
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/send-push")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert!(headers["access-control-allow-headers"]
            .to_str()
            .unwrap()
            .contains("content-type"));
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn relays_valid_request() {
        let (app, provider) = make_test_app(None, configured());

        let response = app
            .oneshot(post_json(r#"{"title":"منتج جديد! 🎉","message":"كنافة"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["id"], "abc");
        assert_eq!(body["data"]["segment"], "All");
        assert!(body.get("error").is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_message_is_a_failure() {
        let (app, provider) = make_test_app(None, configured());

        let response = app
            .oneshot(post_json(r#"{"title":"عرض"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert!(!body["error"].as_str().unwrap().is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_body_is_a_failure() {
        let (app, provider) = make_test_app(None, configured());

        let response = app.oneshot(post_json("{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("invalid request body"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_credentials_are_reported() {
        let (app, provider) = make_test_app(
            None,
            CredentialsSource::Static {
                app_id: None,
                api_key: None,
            },
        );

        let response = app
            .oneshot(post_json(r#"{"title":"t","message":"m"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("missing configuration"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn relay_token_is_enforced() {
        let (app, provider) = make_test_app(Some("s3cret"), configured());

        let response = app
            .clone()
            .oneshot(post_json(r#"{"title":"t","message":"m"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);

        let mut request = post_json(r#"{"title":"t","message":"m"}"#);
        request
            .headers_mut()
            .insert("authorization", "Bearer s3cret".parse().unwrap());
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn bearer_scheme_is_case_insensitive() {
        let (app, provider) = make_test_app(Some("tok "), configured());

        for value in ["Bearer tok ", "bearer tok", "BEARER  tok"] {
            let mut request = post_json(r#"{"title":"t","message":"m"}"#);
            request
                .headers_mut()
                .insert("authorization", value.parse().unwrap());
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{:?}", value);
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);

        for value in ["Basic tok", "Bearer", "Bearertok", "Bearer other"] {
            let mut request = post_json(r#"{"title":"t","message":"m"}"#);
            request
                .headers_mut()
                .insert("authorization", value.parse().unwrap());
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{:?}", value);
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn health_reports_version() {
        let (app, _) = make_test_app(None, configured());
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn unknown_paths_share_one_metrics_label() {
        use crate::server::metrics::HTTP_REQUESTS_TOTAL;
        use crate::server::UNMATCHED_ROUTE_LABEL;
        use prometheus::core::Collector;

        let (app, _) = make_test_app(None, configured());
        let unmatched =
            HTTP_REQUESTS_TOTAL.with_label_values(&["GET", UNMATCHED_ROUTE_LABEL, "404"]);
        let before = unmatched.get();

        for i in 0..50 {
            let request = Request::builder()
                .uri(format!("/scan/{}", i))
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }

        assert_eq!(unmatched.get() - before, 50.0);
        let scan_series = HTTP_REQUESTS_TOTAL
            .collect()
            .iter()
            .flat_map(|family| family.get_metric().iter())
            .filter(|metric| {
                metric.get_label().iter().any(|label| {
                    label.get_name() == "path" && label.get_value().starts_with("/scan")
                })
            })
            .count();
        assert_eq!(scan_series, 0);
    }

    #[tokio::test]
    async fn routed_requests_are_labelled_by_route() {
        use crate::server::metrics::HTTP_REQUESTS_TOTAL;

        let (app, _) = make_test_app(None, configured());
        let health = HTTP_REQUESTS_TOTAL.with_label_values(&["GET", "/health", "200"]);
        let before = health.get();

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        app.oneshot(request).await.unwrap();

        assert!(health.get() - before >= 1.0);
    }
}
