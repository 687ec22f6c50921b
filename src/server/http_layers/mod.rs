mod cors;
mod requests_logging;

pub use cors::{cors_headers, preflight};
pub use requests_logging::{log_requests, RequestsLoggingLevel, UNMATCHED_ROUTE_LABEL};
