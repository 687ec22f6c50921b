use serde::{Deserialize, Serialize};

use super::RelayError;

/// Audience segment used when the request does not name one.
pub const DEFAULT_SEGMENT: &str = "All";

/// A broadcast request coming from the admin dashboard.
///
/// Fields are optional on the wire so that a missing title or message turns
/// into a relay failure instead of a body rejection.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct NotificationRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub segment: Option<String>,
}

/// A request that passed validation and is ready to be sent.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedNotification {
    pub title: String,
    pub message: String,
    pub segment: String,
}

impl NotificationRequest {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            message: Some(message.into()),
            segment: None,
        }
    }

    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = Some(segment.into());
        self
    }

    /// Checks that title and message are present and fills in the segment.
    pub fn validate(&self) -> Result<ValidatedNotification, RelayError> {
        let title = non_blank(self.title.as_deref());
        let message = non_blank(self.message.as_deref());

        let (title, message) = match (title, message) {
            (Some(title), Some(message)) => (title, message),
            (None, None) => {
                return Err(RelayError::InvalidRequest(
                    "title and message are required".to_string(),
                ))
            }
            (None, _) => return Err(RelayError::InvalidRequest("title is required".to_string())),
            (_, None) => {
                return Err(RelayError::InvalidRequest(
                    "message is required".to_string(),
                ))
            }
        };

        let segment = non_blank(self.segment.as_deref()).unwrap_or(DEFAULT_SEGMENT);

        Ok(ValidatedNotification {
            title: title.to_string(),
            message: message.to_string(),
            segment: segment.to_string(),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Envelope returned by the relay for every request.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RelayResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelayResponse {
    pub fn success(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
