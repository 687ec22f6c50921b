//! Storefront push library
//!
//! Push-notification delivery path of the storefront: the credential-holding
//! relay, client subscription state, visitor tracking and the service-worker
//! notification lifecycle.

pub mod config;
pub mod poll;
pub mod relay;
pub mod server;
pub mod session;
pub mod subscription;
pub mod tracking;
pub mod worker;

// Re-export commonly used types for convenience
pub use relay::{NotificationRequest, RelayResponse, RelayService};
pub use server::{run_server, RequestsLoggingLevel};
pub use session::{ensure_session_id, LocalStore};
