//! Client-side push subscription state.
//!
//! The provider's client library loads asynchronously, so it is reached
//! through an explicit [`ClientSlot`] that the manager polls during
//! initialization instead of an ambient global.

mod client;
mod feedback;
mod manager;

pub use client::{ClientError, ClientOptions, ClientSlot, PushClient};
pub use feedback::{LogFeedback, Notice, NoticeKind, UserFeedback};
pub use manager::{InitSettings, SubscriptionManager, SubscriptionSnapshot, SubscriptionStatus};
