use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const FALLBACK_ICON: &str = "/icons/icon-192x192.png";
pub const DEFAULT_TAG: &str = "general";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl NotificationAction {
    /// The single action shown when the payload carries none.
    pub fn view() -> Self {
        Self {
            action: "view".to_string(),
            title: "عرض".to_string(),
            icon: None,
        }
    }
}

/// Push payload as delivered by the provider. Every field is optional on the
/// wire; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub icon: Option<String>,
    pub badge: Option<String>,
    pub data: Option<Value>,
    pub actions: Option<Vec<NotificationAction>>,
}

impl PushPayload {
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// `data.type`, when it is a string.
    pub fn notification_type(&self) -> Option<&str> {
        self.data.as_ref()?.get("type")?.as_str()
    }

    pub fn into_notification(self) -> DisplayedNotification {
        let tag = self.notification_type().unwrap_or(DEFAULT_TAG).to_string();
        let actions = match self.actions {
            Some(actions) if !actions.is_empty() => actions,
            _ => vec![NotificationAction::view()],
        };

        DisplayedNotification {
            title: self.title,
            options: NotificationOptions {
                body: self.body,
                icon: self.icon.unwrap_or_else(|| FALLBACK_ICON.to_string()),
                badge: self.badge.unwrap_or_else(|| FALLBACK_ICON.to_string()),
                actions,
                tag,
                dir: "rtl".to_string(),
                lang: "ar".to_string(),
                renotify: true,
                data: self.data.unwrap_or(Value::Null),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub actions: Vec<NotificationAction>,
    pub tag: String,
    pub dir: String,
    pub lang: String,
    pub renotify: bool,
    pub data: Value,
}

/// A notification as handed to the platform, and as returned on click.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayedNotification {
    pub title: String,
    pub options: NotificationOptions,
}

impl DisplayedNotification {
    pub fn notification_type(&self) -> Option<&str> {
        self.options.data.get("type")?.as_str()
    }
}

/// In-app path opened when a notification of the given type is clicked.
pub fn target_path(notification_type: Option<&str>) -> &'static str {
    match notification_type {
        Some("product") | Some("order") | Some("offer") => "/",
        _ => "/",
    }
}
