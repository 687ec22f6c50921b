//! Per-browser local storage and the anonymous session identifier.

mod session_id;
mod store;

pub use session_id::{ensure_session_id, generate_session_id};
pub use store::{JsonFileStore, LocalStore, MemoryStore, StoreError};

/// Storage key of the anonymous session identifier.
pub const SESSION_ID_KEY: &str = "session_id";
/// Storage key of the "install app" banner dismissal flag.
pub const INSTALL_DISMISSED_KEY: &str = "pwa-install-dismissed";
/// Storage key of the theme preference.
pub const THEME_KEY: &str = "theme";
