//! Error types for usage logging and cost aggregation.

use std::path::PathBuf;
use thiserror::Error;

/// Cost tracking errors.
///
/// Only whole-file conditions surface here. Per-line problems are handled
/// inside the scan (skip + diagnostic) and never reach this type.
#[derive(Error, Debug)]
pub enum CostError {
    /// The usage log does not exist yet
    #[error("usage log not found: {path}")]
    LogNotFound { path: PathBuf },

    /// IO error (file reading or appending)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A date bound on the command line could not be parsed
    #[error("invalid date {input:?}: expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS")]
    InvalidDate { input: String },
}

impl CostError {
    /// Create a user-friendly message for this error.
    pub fn friendly_message(&self) -> String {
        match self {
            CostError::LogNotFound { path } => {
                format!(
                    "Usage log not found: {}. It is created after the first chat request.",
                    path.display()
                )
            }
            CostError::Io(e) => {
                let msg = e.to_string().to_lowercase();
                if msg.contains("permission") {
                    "Permission denied. Check file permissions on the usage log.".to_string()
                } else {
                    format!("File system error: {}", e)
                }
            }
            CostError::InvalidDate { .. } => format!("{}", self),
        }
    }
}

/// Result type for cost tracking operations.
pub type Result<T> = std::result::Result<T, CostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_not_found_message() {
        let err = CostError::LogNotFound {
            path: "/home/user/.gptchat/token_usage.log".into(),
        };
        assert!(err.to_string().contains("token_usage.log"));
        assert!(err.friendly_message().contains("first chat request"));
    }

    #[test]
    fn test_invalid_date_message() {
        let err = CostError::InvalidDate {
            input: "yesterday".to_string(),
        };
        assert!(err.to_string().contains("yesterday"));
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }
}
