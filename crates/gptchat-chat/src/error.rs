//! Error types for the chat client.

use thiserror::Error;

/// Chat client errors.
#[derive(Debug, Error)]
pub enum ChatError {
    /// API request failed (non-2xx response)
    #[error("API request failed: {0}")]
    Api(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Streaming response ended badly or carried malformed events
    #[error("Streaming error: {0}")]
    Stream(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML configuration parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] gptchat_core::CoreError),
}

impl ChatError {
    /// Get a user-friendly error message.
    pub fn friendly_message(&self) -> String {
        match self {
            ChatError::Api(msg) if msg.contains("401") || msg.contains("unauthorized") => {
                "Authentication failed. Check your API key.".to_string()
            }
            ChatError::Api(msg) => msg.clone(),
            ChatError::Config(msg) => format!("Configuration error: {}", msg),
            ChatError::Http(e) if e.is_timeout() => {
                "Request timed out. Check your connection.".to_string()
            }
            ChatError::Http(e) if e.is_connect() => {
                "Could not connect to the API. Check your network.".to_string()
            }
            _ => format!("Error: {}", self),
        }
    }

    /// Classify an HTTP status code into an error.
    pub fn from_http_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => ChatError::Api(format!("Authentication error ({}): {}", status, body)),
            429 => ChatError::Api(format!("Rate limited by the API ({}): {}", status, body)),
            _ => ChatError::Api(format!("HTTP {}: {}", status, body)),
        }
    }
}

/// Result type for chat operations.
pub type Result<T> = std::result::Result<T, ChatError>;
