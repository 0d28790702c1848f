use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

pub mod codes;

pub use codes::{describe_error_code, ErrorCode};

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// The unified error type for relishplus
#[derive(Error, Debug)]
pub enum RelishError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Credential error: {message}")]
    Credentials { code: u16, message: String },

    #[error("[E{code:04}] Session error: {message}")]
    Session {
        code: u16,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Executor error: {message}")]
    Executor {
        code: u16,
        message: String,
        action: Option<String>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Ordering error: {message}")]
    Ordering {
        code: u16,
        message: String,
        slot: Option<String>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] {message}")]
    Other {
        code: u16,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl RelishError {
    /// Create a configuration error with default code
    pub fn config(message: impl Into<String>) -> Self {
        Self::config_with_code(ErrorCode::CONFIG_GENERIC, message)
    }

    /// Create a configuration error with specific code
    pub fn config_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            path: None,
            source: None,
        }
    }

    /// Create a credential error
    pub fn missing_credentials(message: impl Into<String>) -> Self {
        Self::Credentials {
            code: ErrorCode::CREDENTIALS_MISSING,
            message: message.into(),
        }
    }

    /// Create a session error with specific code
    pub fn session_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Session {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Error raised when the external cancellation signal fires
    pub fn cancelled() -> Self {
        Self::session_with_code(ErrorCode::SESSION_CANCELLED, "run cancelled")
    }

    /// Create an executor error with default code
    pub fn executor(message: impl Into<String>) -> Self {
        Self::executor_with_code(ErrorCode::EXEC_GENERIC, message, None)
    }

    /// Create an executor error with specific code and the action that failed
    pub fn executor_with_code(
        code: u16,
        message: impl Into<String>,
        action: Option<String>,
    ) -> Self {
        Self::Executor {
            code,
            message: message.into(),
            action,
            source: None,
        }
    }

    /// Create an ordering error with specific code for a slot
    pub fn ordering_with_code(
        code: u16,
        message: impl Into<String>,
        slot: Option<String>,
    ) -> Self {
        Self::Ordering {
            code,
            message: message.into(),
            slot,
            source: None,
        }
    }

    /// Create a generic other error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            code: ErrorCode::OTHER_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the file path a configuration error refers to
    pub fn with_path(mut self, config_path: impl Into<PathBuf>) -> Self {
        if let Self::Config { ref mut path, .. } = self {
            *path = Some(config_path.into());
        }
        self
    }

    /// Add a source error to this error
    pub fn with_source(mut self, source: impl Into<BoxedSource>) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::Session { source: src, .. }
            | Self::Executor { source: src, .. }
            | Self::Ordering { source: src, .. }
            | Self::Other { source: src, .. } => {
                *src = Some(source.into());
            }
            Self::Credentials { .. } => {}
        }
        self
    }

    /// Add context to the error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        match &mut self {
            Self::Config { message, .. }
            | Self::Credentials { message, .. }
            | Self::Session { message, .. }
            | Self::Executor { message, .. }
            | Self::Ordering { message, .. }
            | Self::Other { message, .. } => {
                *message = format!("{}: {}", message, context);
            }
        }
        self
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Credentials { .. } => 3,
            Self::Session { code, .. } if *code == ErrorCode::SESSION_CANCELLED => 130,
            Self::Session { .. } => 4,
            Self::Executor { .. } => 5,
            Self::Ordering { .. } => 6,
            Self::Other { .. } => 1,
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Credentials { code, .. }
            | Self::Session { code, .. }
            | Self::Executor { code, .. }
            | Self::Ordering { code, .. }
            | Self::Other { code, .. } => *code,
        }
    }

    /// Whether this error aborts the whole run rather than a single slot
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::Credentials { .. } | Self::Session { .. }
        )
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, path, .. } => match path {
                Some(p) => format!("Configuration problem in {}: {}", p.display(), message),
                None => format!("Configuration problem: {}", message),
            },
            Self::Credentials { message, .. } => format!(
                "{}. Set RELISH_EMAIL and RELISH_PASSWORD environment variables",
                message
            ),
            Self::Session { message, .. } => format!("Session error: {}", message),
            Self::Executor {
                message, action, ..
            } => match action {
                Some(a) => format!("Browser action '{}' failed: {}", a, message),
                None => format!("Browser error: {}", message),
            },
            Self::Ordering { message, slot, .. } => match slot {
                Some(s) => format!("Order for {} failed: {}", s, message),
                None => format!("Ordering error: {}", message),
            },
            Self::Other { message, .. } => message.clone(),
        }
    }

    /// Get a developer-friendly error message with full chain
    pub fn developer_message(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str(&format!("\n  caused by: {}", cause));
            source = cause.source();
        }
        out
    }
}

/// Type alias for Results using RelishError
pub type Result<T> = std::result::Result<T, RelishError>;

/// Type alias for application Results (using anyhow for flexibility)
pub type AppResult<T> = anyhow::Result<T>;

impl From<serde_yaml::Error> for RelishError {
    fn from(err: serde_yaml::Error) -> Self {
        RelishError::config_with_code(ErrorCode::CONFIG_INVALID_YAML, "Invalid YAML syntax")
            .with_source(err)
    }
}

impl From<serde_json::Error> for RelishError {
    fn from(err: serde_json::Error) -> Self {
        RelishError::executor_with_code(
            ErrorCode::EXEC_PROTOCOL_ERROR,
            "Invalid driver message",
            None,
        )
        .with_source(err)
    }
}

impl From<std::io::Error> for RelishError {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::TimedOut => ErrorCode::EXEC_TIMEOUT,
            std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::UnexpectedEof => {
                ErrorCode::EXEC_DRIVER_EXITED
            }
            _ => ErrorCode::EXEC_GENERIC,
        };
        RelishError::executor_with_code(code, "I/O failure talking to the driver", None)
            .with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation_and_chaining() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "config.yml");
        let err = RelishError::config_with_code(ErrorCode::CONFIG_IO_ERROR, "Cannot read file")
            .with_source(io_err)
            .with_context("while loading configuration");

        assert_eq!(err.code(), ErrorCode::CONFIG_IO_ERROR);
        assert!(err.to_string().contains("[E1006]"));
        assert!(err.user_message().contains("Cannot read file"));
        assert!(err.developer_message().contains("caused by: config.yml"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(RelishError::config("bad").exit_code(), 2);
        assert_eq!(RelishError::missing_credentials("none").exit_code(), 3);
        assert_eq!(RelishError::cancelled().exit_code(), 130);
        assert_eq!(RelishError::executor("boom").exit_code(), 5);
    }

    #[test]
    fn test_fatal_classification() {
        assert!(RelishError::missing_credentials("none").is_fatal());
        assert!(
            RelishError::session_with_code(ErrorCode::SESSION_LOGIN_FAILED, "rejected").is_fatal()
        );
        assert!(!RelishError::executor("click failed").is_fatal());
        assert!(!RelishError::ordering_with_code(ErrorCode::ORDER_EMPTY_CART, "empty", None)
            .is_fatal());
    }

    #[test]
    fn test_user_message_mentions_path() {
        let err = RelishError::config("days must be at least 1").with_path("/tmp/config.yml");
        assert!(err.user_message().contains("/tmp/config.yml"));
    }
}
