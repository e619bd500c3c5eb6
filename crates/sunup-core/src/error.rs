//! Unified error types for sunup.

use thiserror::Error;

/// Result type alias using SunupError.
pub type Result<T> = std::result::Result<T, SunupError>;

#[derive(Error, Debug)]
pub enum SunupError {
    // Sun times service errors
    #[error("Sun times service error: {0}")]
    Service(String),

    // Store errors
    #[error("Chat not found: {0}")]
    ChatNotFound(i64),

    // Scheduler errors
    #[error("Scheduler is closed")]
    SchedulerClosed,

    #[error("Cannot install notifier for chat {chat_id}: service not available after {attempts} attempts")]
    InstallFailed { chat_id: i64, attempts: u32 },

    // Delivery errors
    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Chat {0} is no longer reachable")]
    ChatUnreachable(i64),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SunupError {
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::Delivery(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether a retry of the failed operation could plausibly succeed.
    /// Drives the retry policy: only transient failures are worth another
    /// attempt, everything else is reported immediately.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Service(_) | Self::Delivery(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SunupError::Service("timeout".into());
        assert!(err.to_string().contains("timeout"));

        let err = SunupError::InstallFailed {
            chat_id: 42,
            attempts: 5,
        };
        assert!(err.to_string().contains("42"));
        assert!(err.to_string().contains("5"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(SunupError::service("down").is_transient());
        assert!(SunupError::delivery("flaky").is_transient());
        assert!(!SunupError::SchedulerClosed.is_transient());
        assert!(!SunupError::ChatNotFound(1).is_transient());
        assert!(!SunupError::ChatUnreachable(1).is_transient());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SunupError = io_err.into();
        assert!(matches!(err, SunupError::Io(_)));
    }
}
