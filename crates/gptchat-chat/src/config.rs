//! Configuration for the chat client.
//!
//! Defaults live in code; `~/.gptchat/config.yaml` may override any field,
//! and command-line flags override both. A missing config file is not an
//! error.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Chat client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Model to use for chat (e.g., "gpt-4o")
    pub model: String,

    /// Temperature for responses (0.0 - 2.0)
    pub temperature: f32,

    /// Maximum tokens for responses
    pub max_tokens: u32,

    /// API base URL (defaults to the OpenAI API)
    pub api_base_url: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Response timeout in seconds
    pub timeout_secs: u64,

    /// Fence assistant replies in code blocks in saved transcripts
    pub markdown_output: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 0.5,
            max_tokens: 500,
            api_base_url: "https://api.openai.com".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 60,
            markdown_output: false,
        }
    }
}

impl ChatConfig {
    /// Load configuration from a YAML file, falling back to defaults when
    /// the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        debug!(path = %path.display(), model = %config.model, "loaded config file");
        Ok(config)
    }

    /// Create a new config with a custom model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Create a new config with a custom API base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Create a new config with markdown transcript output toggled.
    pub fn with_markdown_output(mut self, markdown: bool) -> Self {
        self.markdown_output = markdown;
        self
    }

    /// Create a new config with a custom temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}
