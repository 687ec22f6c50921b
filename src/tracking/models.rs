use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Visit,
    Download,
    InstallPrompt,
    Install,
    AppOpen,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Visit => "visit",
            EventType::Download => "download",
            EventType::InstallPrompt => "install_prompt",
            EventType::Install => "install",
            EventType::AppOpen => "app_open",
        }
    }
}

/// Browser lifecycle signals that map one-to-one onto tracked events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrowserSignal {
    /// The browser offered to install the site as an app.
    InstallPromptAvailable,
    /// The site was installed as an app.
    AppInstalled,
}

impl BrowserSignal {
    pub fn event_type(&self) -> EventType {
        match self {
            BrowserSignal::InstallPromptAvailable => EventType::InstallPrompt,
            BrowserSignal::AppInstalled => EventType::Install,
        }
    }
}

/// Snapshot of the visitor's device taken when an event is tracked.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub user_agent: String,
    pub platform: String,
    pub language: String,
    /// Formatted as `<width>x<height>`.
    pub screen_resolution: String,
    pub online: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_type: Option<String>,
    /// Running as an installed app rather than in a browser tab.
    pub standalone: bool,
}

/// Source of fresh device snapshots.
pub trait DeviceProbe: Send + Sync {
    fn snapshot(&self) -> DeviceInfo;
}

/// A fixed snapshot, for hosts whose device details do not change.
impl DeviceProbe for DeviceInfo {
    fn snapshot(&self) -> DeviceInfo {
        self.clone()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageContext {
    pub page_url: Option<String>,
    pub referrer: Option<String>,
}

/// Row submitted to the analytics sink.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub session_id: String,
    pub event_type: EventType,
    pub device_info: DeviceInfo,
    pub page_url: Option<String>,
    pub referrer: Option<String>,
    pub created_at: DateTime<Utc>,
}
