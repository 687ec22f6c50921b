//! Shared constants for end-to-end tests

// ============================================================================
// Provider credentials
// ============================================================================

pub const TEST_APP_ID: &str = "test-app-id";

pub const TEST_API_KEY: &str = "test-rest-api-key";

pub const TEST_SITE_URL: &str = "https://shop.example";

pub const TEST_RELAY_TOKEN: &str = "relay-secret";

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for the server to become ready
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Per-request timeout of the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Interval between readiness probes
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
