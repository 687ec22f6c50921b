//! Notification relay
//!
//! The single trusted path holding push provider credentials. Admin requests
//! come in as [`NotificationRequest`]s and leave as one provider call each.

mod credentials;
mod models;
mod onesignal;
mod provider;
mod service;

pub use credentials::{CredentialsSource, ProviderCredentials, API_KEY_ENV_VAR, APP_ID_ENV_VAR};
pub use models::{NotificationRequest, RelayResponse, ValidatedNotification, DEFAULT_SEGMENT};
pub use onesignal::{OneSignalClient, ONESIGNAL_API_BASE};
pub use provider::{PushError, PushProvider};
pub use service::{RelayError, RelayService};
