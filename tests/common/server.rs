//! Test server lifecycle management
//!
//! Each test gets its own relay server and its own fake provider.

use super::constants::*;
use super::fake_provider::FakeProvider;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use storefront_push::poll::poll_until;
use storefront_push::relay::{CredentialsSource, OneSignalClient, RelayService};
use storefront_push::server::{make_app, RequestsLoggingLevel, ServerConfig};
use tokio::net::TcpListener;

/// Knobs for [`TestServer::spawn_with`].
pub struct TestServerOptions {
    pub app_id: Option<String>,
    pub api_key: Option<String>,
    pub relay_token: Option<String>,
    /// Defaults to a provider accepting every notification.
    pub provider: Option<FakeProvider>,
    /// Points the relay somewhere other than `provider`.
    pub provider_base_url: Option<String>,
    pub provider_timeout_sec: u64,
}

impl Default for TestServerOptions {
    fn default() -> Self {
        Self {
            app_id: Some(TEST_APP_ID.to_string()),
            api_key: Some(TEST_API_KEY.to_string()),
            relay_token: None,
            provider: None,
            provider_base_url: None,
            provider_timeout_sec: 5,
        }
    }
}

/// Relay server bound to a random local port.
///
/// When dropped, the server gracefully shuts down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The provider the relay forwards to
    pub provider: FakeProvider,

    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a relay with valid credentials and an accepting provider.
    pub async fn spawn() -> Self {
        Self::spawn_with(TestServerOptions::default()).await
    }

    /// # Panics
    ///
    /// Panics if binding fails or the server does not become ready in time.
    pub async fn spawn_with(options: TestServerOptions) -> Self {
        let provider = match options.provider {
            Some(provider) => provider,
            None => FakeProvider::accepting().await,
        };

        let provider_base_url = options
            .provider_base_url
            .unwrap_or_else(|| provider.base_url.clone());
        let client = OneSignalClient::new(
            provider_base_url,
            TEST_SITE_URL,
            options.provider_timeout_sec,
        )
        .expect("Failed to build provider client");
        let relay = Arc::new(RelayService::new(
            Arc::new(client),
            CredentialsSource::Static {
                app_id: options.app_id,
                api_key: options.api_key,
            },
        ));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            relay_token: options.relay_token,
            ..ServerConfig::default()
        };
        let app = make_app(config, relay);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .expect("Server failed");
        });

        let server = Self {
            base_url: format!("http://127.0.0.1:{}", port),
            provider,
            _shutdown_tx: Some(shutdown_tx),
        };
        server.wait_for_ready().await;
        server
    }

    /// Polls `/health` until it answers.
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");
        let url = format!("{}/health", self.base_url);

        let ready = poll_until(
            Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS),
            Duration::from_millis(SERVER_READY_TIMEOUT_MS),
            || {
                let request = client.get(&url).send();
                async move {
                    match request.await {
                        Ok(response) if response.status().is_success() => Some(()),
                        _ => None,
                    }
                }
            },
        )
        .await;

        if ready.is_none() {
            panic!(
                "Server did not become ready within {}ms",
                SERVER_READY_TIMEOUT_MS
            );
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
