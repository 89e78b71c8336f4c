//! Error types for wpharness-core

use thiserror::Error;

/// Core error type for oracle construction and configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Configuration value is out of range or malformed
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// A config file or value could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Filesystem access failed
    #[error("IO error: {0}")]
    IoError(String),

    /// Structured validation failure with the offending key
    #[error("Validation error: {message}")]
    ValidationError {
        message: String,
        field: Option<String>,
        value: Option<String>,
    },
}

impl Error {
    /// Create a validation error for a named config key.
    pub fn validation(
        message: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
            value: Some(value.into()),
        }
    }

    /// Process exit code for this error class.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidConfig(_) | Self::ParseError(_) | Self::ValidationError { .. } => 1,
            Self::IoError(_) => 2,
        }
    }
}

/// Result type alias for wpharness-core operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_keeps_field_and_value() {
        let err = Error::validation("must be positive", "post_id", "0");
        match err {
            Error::ValidationError { field, value, .. } => {
                assert_eq!(field.as_deref(), Some("post_id"));
                assert_eq!(value.as_deref(), Some("0"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn io_errors_exit_with_system_code() {
        assert_eq!(Error::IoError("gone".into()).exit_code(), 2);
        assert_eq!(Error::InvalidConfig("bad".into()).exit_code(), 1);
    }
}
