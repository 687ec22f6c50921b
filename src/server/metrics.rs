use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::time::Duration;

/// Metric name prefix for all storefront metrics
const PREFIX: &str = "storefront";

lazy_static! {
    // Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Relay Metrics
    pub static ref RELAY_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_relay_requests_total"), "Push relay requests by outcome"),
        &["outcome"]
    ).expect("Failed to create relay_requests_total metric");

    pub static ref PROVIDER_CALL_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_provider_call_duration_seconds"),
            "Push provider call duration in seconds"
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["provider", "status"]
    ).expect("Failed to create provider_call_duration_seconds metric");

    // Tracking Metrics
    pub static ref TRACKING_EVENTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_tracking_events_total"), "Interaction events by outcome"),
        &["event_type", "outcome"]
    ).expect("Failed to create tracking_events_total metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Register all metrics - ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(RELAY_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(PROVIDER_CALL_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(TRACKING_EVENTS_TOTAL.clone()));

    tracing::info!("Metrics system initialized successfully");
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

pub fn record_relay_outcome(outcome: &str) {
    RELAY_REQUESTS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_provider_call(provider: &str, success: bool, duration: Duration) {
    let status = if success { "success" } else { "failure" };
    PROVIDER_CALL_DURATION_SECONDS
        .with_label_values(&[provider, status])
        .observe(duration.as_secs_f64());
}

pub fn record_tracking_event(event_type: &str, outcome: &str) {
    TRACKING_EVENTS_TOTAL
        .with_label_values(&[event_type, outcome])
        .inc();
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find_family(name: &str) -> Option<prometheus::proto::MetricFamily> {
        REGISTRY
            .gather()
            .into_iter()
            .find(|m| m.get_name() == name)
    }

    #[test]
    fn test_record_http_request() {
        init_metrics();

        record_http_request("POST", "/send-push", 200, Duration::from_millis(50));

        assert!(
            find_family("storefront_http_requests_total").is_some(),
            "HTTP request metrics should exist"
        );
    }

    #[test]
    fn test_record_relay_outcomes() {
        init_metrics();

        let before = RELAY_REQUESTS_TOTAL
            .with_label_values(&["invalid_request"])
            .get();
        record_relay_outcome("invalid_request");
        record_provider_call("onesignal", false, Duration::from_millis(120));

        assert_eq!(
            RELAY_REQUESTS_TOTAL
                .with_label_values(&["invalid_request"])
                .get(),
            before + 1.0
        );
        assert!(find_family("storefront_provider_call_duration_seconds").is_some());
    }

    #[test]
    fn test_record_tracking_event() {
        init_metrics();

        record_tracking_event("visit", "dropped");

        assert!(find_family("storefront_tracking_events_total").is_some());
    }
}
