//! Pluggable completion provider trait and test mock.
//!
//! [`CompletionProvider`] abstracts the completion backend so session
//! logic (the REPL, title and summary generation) can run against
//! [`MockProvider`] in tests and [`crate::OpenAiProvider`] in production.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::error::Result;
use crate::openai_api_types::ApiMessage;

/// Result of a non-streaming completion call.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Assistant reply text.
    pub text: String,

    /// Total tokens reported by the API for this request, if any.
    pub total_tokens: Option<u32>,

    /// Duration in milliseconds.
    pub duration_ms: u64,
}

/// Per-call overrides for sampling parameters.
///
/// Fields left `None` fall back to the provider's configured defaults.
/// Title and summary generation use these to run cooler and shorter than
/// regular chat turns.
#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl CompletionOptions {
    /// Override the temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Override the response token budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// A completion backend.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Run a non-streaming completion over `messages`.
    async fn complete(
        &self,
        messages: &[ApiMessage],
        options: CompletionOptions,
    ) -> Result<Completion>;

    /// Run a streaming completion over `messages`, yielding text deltas.
    async fn stream_reply(
        &self,
        messages: &[ApiMessage],
        options: CompletionOptions,
    ) -> Result<BoxStream<'static, Result<String>>>;

    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Model this provider talks to.
    fn model(&self) -> &str;
}

/// Testing mock that returns queued responses.
///
/// Each call pops the next queued response; an empty queue yields a fixed
/// fallback. Requests are recorded for assertion.
pub struct MockProvider {
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<Vec<ApiMessage>>>,
    total_tokens: Option<u32>,
    model: String,
}

impl MockProvider {
    /// Create a mock with an empty response queue.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            total_tokens: Some(42),
            model: "mock-model".to_string(),
        }
    }

    /// Queue a response.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses
            .lock()
            .expect("mock lock poisoned")
            .push_back(response.into());
        self
    }

    /// Set the token total reported with each completion.
    pub fn with_total_tokens(mut self, total_tokens: Option<u32>) -> Self {
        self.total_tokens = total_tokens;
        self
    }

    /// Messages passed to each call, in call order.
    pub fn requests(&self) -> Vec<Vec<ApiMessage>> {
        self.requests.lock().expect("mock lock poisoned").clone()
    }

    fn next_response(&self) -> String {
        self.responses
            .lock()
            .expect("mock lock poisoned")
            .pop_front()
            .unwrap_or_else(|| "mock response".to_string())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(
        &self,
        messages: &[ApiMessage],
        _options: CompletionOptions,
    ) -> Result<Completion> {
        self.requests
            .lock()
            .expect("mock lock poisoned")
            .push(messages.to_vec());
        Ok(Completion {
            text: self.next_response(),
            total_tokens: self.total_tokens,
            duration_ms: 0,
        })
    }

    async fn stream_reply(
        &self,
        messages: &[ApiMessage],
        _options: CompletionOptions,
    ) -> Result<BoxStream<'static, Result<String>>> {
        self.requests
            .lock()
            .expect("mock lock poisoned")
            .push(messages.to_vec());
        let text = self.next_response();

        // Yield the reply in two deltas to exercise accumulation
        let mut mid = text.len() / 2;
        while !text.is_char_boundary(mid) {
            mid -= 1;
        }
        let (head, tail) = text.split_at(mid);
        let deltas: Vec<Result<String>> = vec![Ok(head.to_string()), Ok(tail.to_string())];
        Ok(Box::pin(futures_util::stream::iter(deltas)))
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn test_mock_pops_queued_responses() {
        let mock = MockProvider::new()
            .with_response("first")
            .with_response("second");

        let messages = vec![ApiMessage::user("hi")];
        let first = mock.complete(&messages, Default::default()).await.unwrap();
        let second = mock.complete(&messages, Default::default()).await.unwrap();
        let fallback = mock.complete(&messages, Default::default()).await.unwrap();

        assert_eq!(first.text, "first");
        assert_eq!(second.text, "second");
        assert_eq!(fallback.text, "mock response");
        assert_eq!(mock.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_mock_streaming_accumulates_to_full_text() {
        let mock = MockProvider::new().with_response("streamed reply");

        let mut stream = mock
            .stream_reply(&[ApiMessage::user("hi")], Default::default())
            .await
            .unwrap();

        let mut full = String::new();
        while let Some(delta) = stream.next().await {
            full.push_str(&delta.unwrap());
        }
        assert_eq!(full, "streamed reply");
    }
}
