//! Error types and exit codes for qnote
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure
//! - 2: Usage error (bad flags/args)
//! - 3: Data/store error (corrupt QNOT stream, missing book, etc.)

mod macros;

use std::path::PathBuf;
use thiserror::Error;

use crate::encoding::CodecError;

/// Exit codes for the qnote binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage error - bad flags/args (2)
    Usage = 2,
    /// Data/store error - corrupt input, missing book (3)
    Data = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<rusqlite::Error> for QnoteError {
    fn from(err: rusqlite::Error) -> Self {
        QnoteError::Other(err.to_string())
    }
}

/// Errors that can occur during qnote operations
#[derive(Error, Debug)]
pub enum QnoteError {
    // Usage errors (exit code 2)
    #[error("unknown format: {0} (expected: human or json)")]
    UnknownFormat(String),

    #[error("{0}")]
    UsageError(String),

    // Data/store errors (exit code 3)
    #[error("invalid data directory {path:?}: {reason}")]
    InvalidDataDir { path: PathBuf, reason: String },

    #[error("book not found: {name}")]
    BookNotFound { name: String },

    #[error("QNOT stream error: {0}")]
    Codec(#[from] CodecError),

    // Generic failures (exit code 1)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid {context}: {value}")]
    InvalidValue { context: String, value: String },

    #[error("{context} not found: {value}")]
    NotFound { context: String, value: String },

    #[error("failed to {operation}: {reason}")]
    FailedOperation { operation: String, reason: String },

    #[error("failed to {operation} {target}: {reason}")]
    FailedOperationWithTarget {
        operation: String,
        target: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

impl QnoteError {
    /// Create an error for a failed database operation
    pub fn db_operation(operation: &str, error: impl std::fmt::Display) -> Self {
        QnoteError::FailedOperation {
            operation: operation.to_string(),
            reason: error.to_string(),
        }
    }

    /// Create an error for a failed note operation
    pub fn note_operation(title: &str, operation: &str, error: impl std::fmt::Display) -> Self {
        QnoteError::FailedOperationWithTarget {
            operation: operation.to_string(),
            target: format!("note {:?}", title),
            reason: error.to_string(),
        }
    }

    /// Create an error for a failed IO operation with context
    pub fn io_operation(
        operation: &str,
        path: impl std::fmt::Display,
        error: impl std::fmt::Display,
    ) -> Self {
        QnoteError::FailedOperationWithTarget {
            operation: operation.to_string(),
            target: path.to_string(),
            reason: error.to_string(),
        }
    }

    /// Create an error for an invalid value or configuration
    pub fn invalid_value(context: &str, value: impl std::fmt::Display) -> Self {
        QnoteError::InvalidValue {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for an entity that was not found
    pub fn not_found(context: &str, value: impl std::fmt::Display) -> Self {
        QnoteError::NotFound {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            QnoteError::UnknownFormat(_)
            | QnoteError::UsageError(_)
            | QnoteError::InvalidValue { .. } => ExitCode::Usage,

            QnoteError::InvalidDataDir { .. }
            | QnoteError::BookNotFound { .. }
            | QnoteError::Codec(_)
            | QnoteError::NotFound { .. } => ExitCode::Data,

            QnoteError::Io(_)
            | QnoteError::Json(_)
            | QnoteError::Toml(_)
            | QnoteError::FailedOperation { .. }
            | QnoteError::FailedOperationWithTarget { .. }
            | QnoteError::Other(_) => ExitCode::Failure,
        }
    }

    /// Get the error type identifier
    fn error_type(&self) -> &'static str {
        match self {
            QnoteError::UnknownFormat(_) => "unknown_format",
            QnoteError::UsageError(_) => "usage_error",
            QnoteError::InvalidDataDir { .. } => "invalid_data_dir",
            QnoteError::BookNotFound { .. } => "book_not_found",
            QnoteError::Codec(e) => e.kind(),
            QnoteError::Io(_) => "io_error",
            QnoteError::Json(_) => "json_error",
            QnoteError::Toml(_) => "toml_error",
            QnoteError::InvalidValue { .. } => "invalid_value",
            QnoteError::NotFound { .. } => "not_found",
            QnoteError::FailedOperation { .. } => "failed_operation",
            QnoteError::FailedOperationWithTarget { .. } => "failed_operation_with_target",
            QnoteError::Other(_) => "other",
        }
    }

    /// Convert error to JSON representation for structured error output.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.exit_code() as i32,
                "type": self.error_type(),
                "message": self.to_string(),
            }
        })
    }
}

/// Result type alias for qnote operations
pub type Result<T> = std::result::Result<T, QnoteError>;
