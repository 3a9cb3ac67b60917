//! OpenAI-compatible completions provider using direct HTTP requests.
//!
//! This module provides [`OpenAiProvider`] which talks to a
//! chat-completions endpoint using the reqwest HTTP client, in both
//! non-streaming and SSE streaming modes.
//!
//! ## Example
//!
//! ```no_run
//! use gptchat_chat::{ChatConfig, OpenAiProvider};
//! use gptchat_chat::openai_api_types::ApiMessage;
//! use gptchat_chat::provider::CompletionProvider;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ChatConfig::default();
//! let provider = OpenAiProvider::from_config(config)?;
//!
//! let messages = vec![ApiMessage::user("Hello!")];
//! let completion = provider.complete(&messages, Default::default()).await?;
//! println!("{}", completion.text);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use tokio::time::Duration;
use tracing::debug;

use crate::config::ChatConfig;
use crate::error::{ChatError, Result};
use crate::openai_api_types::{ApiMessage, ApiRequest, ApiResponse, StreamChunk};
use crate::provider::{Completion, CompletionOptions, CompletionProvider};

/// Completion provider for OpenAI-compatible APIs.
pub struct OpenAiProvider {
    config: ChatConfig,
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    /// Create a provider from config, reading the API key from the
    /// configured environment variable.
    pub fn from_config(config: ChatConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            ChatError::Config(format!(
                "{} environment variable not set",
                config.api_key_env
            ))
        })?;
        Self::build(config, api_key)
    }

    /// Create a provider with an explicit API key.
    pub fn with_api_key(config: ChatConfig, api_key: impl Into<String>) -> Result<Self> {
        Self::build(config, api_key.into())
    }

    fn build(config: ChatConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChatError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = config.api_base_url.trim_end_matches('/').to_string();

        Ok(Self {
            config,
            client,
            api_key,
            base_url,
        })
    }

    /// Build the API request from messages and per-call options.
    fn build_request(
        &self,
        messages: &[ApiMessage],
        options: &CompletionOptions,
        stream: bool,
    ) -> ApiRequest {
        ApiRequest {
            model: self.config.model.clone(),
            messages: messages.to_vec(),
            temperature: Some(options.temperature.unwrap_or(self.config.temperature)),
            max_tokens: Some(options.max_tokens.unwrap_or(self.config.max_tokens)),
            stream,
        }
    }

    /// Send a request and return the raw HTTP response after a status check.
    async fn send_request(&self, request: &ApiRequest) -> Result<reqwest::Response> {
        debug!(model = %request.model, stream = request.stream, "sending completion request");

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::from_http_status(status, &body));
        }

        Ok(response)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(
        &self,
        messages: &[ApiMessage],
        options: CompletionOptions,
    ) -> Result<Completion> {
        let start = std::time::Instant::now();

        let request = self.build_request(messages, &options, false);
        let api_response: ApiResponse = self.send_request(&request).await?.json().await?;

        let text = api_response
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or_else(|| ChatError::Api("response contained no choices".to_string()))?;

        Ok(Completion {
            text,
            total_tokens: api_response.usage.map(|usage| usage.total_tokens),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn stream_reply(
        &self,
        messages: &[ApiMessage],
        options: CompletionOptions,
    ) -> Result<BoxStream<'static, Result<String>>> {
        let request = self.build_request(messages, &options, true);
        let response = self.send_request(&request).await?;

        let mut bytes = response.bytes_stream();
        let stream = async_stream::try_stream! {
            let mut buffer = String::new();
            'receive: while let Some(chunk) = bytes.next().await {
                let chunk = chunk?;
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                // Drain complete SSE lines; a partial line stays buffered
                while let Some(newline) = buffer.find('\n') {
                    let line: String = buffer.drain(..=newline).collect();
                    let line = line.trim();
                    let Some(data) = line.strip_prefix("data:") else {
                        continue;
                    };
                    let data = data.trim();
                    if data == "[DONE]" {
                        break 'receive;
                    }

                    let parsed: StreamChunk = serde_json::from_str(data)
                        .map_err(|e| ChatError::Stream(format!("malformed SSE chunk: {}", e)))?;
                    let delta = parsed
                        .choices
                        .first()
                        .and_then(|choice| choice.delta.content.clone());
                    if let Some(delta) = delta {
                        if !delta.is_empty() {
                            yield delta;
                        }
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }

    fn name(&self) -> &str {
        "openai-api"
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
