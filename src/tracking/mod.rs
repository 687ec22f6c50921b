//! Visitor and interaction tracking
//!
//! Best-effort analytics keyed by the per-browser session id. Events go
//! through a bounded queue drained by a background task, so tracking never
//! blocks or fails the caller.

mod models;
mod sink;
mod tracker;

pub use models::{BrowserSignal, DeviceInfo, DeviceProbe, EventType, InteractionEvent, PageContext};
pub use sink::{AnalyticsSink, RestAnalyticsSink, SinkError};
pub use tracker::{InteractionTracker, TrackerSettings};
