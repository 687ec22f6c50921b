//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestClient, TestServer};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_send_push() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.send_push("عنوان", "رسالة", None).await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

mod client;
mod constants;
mod fake_provider;
mod server;

pub use client::TestClient;
pub use constants::*;
pub use fake_provider::{refused_base_url, FakeProvider, FakeServer};
pub use server::{TestServer, TestServerOptions};
