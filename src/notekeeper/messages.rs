//! Transient notifications raised by the session and drained by the adapter.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl MessageLevel {
    /// How long the notification stays up before dismissing itself.
    pub fn duration(self) -> Duration {
        match self {
            MessageLevel::Success => Duration::from_secs(2),
            MessageLevel::Warning | MessageLevel::Error => Duration::from_secs(3),
            MessageLevel::Info => Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: MessageLevel,
    pub content: String,
    pub duration: Duration,
}

impl Notification {
    fn new(level: MessageLevel, content: impl Into<String>) -> Self {
        Self {
            level,
            content: content.into(),
            duration: level.duration(),
        }
    }

    pub fn info(content: impl Into<String>) -> Self {
        Self::new(MessageLevel::Info, content)
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self::new(MessageLevel::Success, content)
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self::new(MessageLevel::Warning, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(MessageLevel::Error, content)
    }
}
