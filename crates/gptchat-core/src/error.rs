//! Error types shared across the gptchat workspace.
//!
//! Errors are designed for visibility: no silent failures, clear messages
//! that name the path and operation that failed.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

/// Error type for core setup and filesystem operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Generic I/O error with context
    #[error("I/O error {operation}: {path}")]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory creation failed
    #[error("Failed to create directory: {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Home directory could not be determined
    #[error("Could not determine home directory")]
    MissingHome,

    /// Internal error (bug in gptchat)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CoreError {
    /// Create an I/O error with operation and path context.
    pub fn io(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_message_names_path() {
        let err = CoreError::io(
            "reading",
            "/tmp/missing.log",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("reading"));
        assert!(err.to_string().contains("/tmp/missing.log"));
    }

    #[test]
    fn test_internal_error() {
        let err = CoreError::internal("bad state");
        assert!(err.to_string().contains("bad state"));
    }
}
