use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient message shown to the user (toast).
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.into(),
            description: description.into(),
        }
    }
}

pub trait UserFeedback: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log, for hosts without a toast surface.
pub struct LogFeedback;

impl UserFeedback for LogFeedback {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Success => info!("{}: {}", notice.title, notice.description),
            NoticeKind::Error => warn!("{}: {}", notice.title, notice.description),
        }
    }
}
