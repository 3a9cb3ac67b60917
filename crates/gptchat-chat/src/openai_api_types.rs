//! OpenAI chat-completions request and response types.
//!
//! This module contains the serde types for serializing requests to and
//! deserializing responses from an OpenAI-compatible chat-completions
//! endpoint, including the SSE chunk shapes used while streaming.

use serde::{Deserialize, Serialize};

/// Request sent to the chat-completions endpoint.
#[derive(Debug, Serialize)]
pub struct ApiRequest {
    pub model: String,
    pub messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

/// Message in a request or response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub role: String,
    pub content: String,
}

impl ApiMessage {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Response received from a non-streaming completion call.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiResponse {
    pub choices: Vec<ApiChoice>,
    #[serde(default)]
    pub usage: Option<ApiUsage>,
}

/// One completion choice.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiChoice {
    pub message: ApiMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token usage totals from a non-streaming response.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// One SSE chunk of a streaming completion.
#[derive(Debug, Deserialize)]
pub struct StreamChunk {
    pub choices: Vec<StreamChoice>,
}

/// One choice within a streaming chunk.
#[derive(Debug, Deserialize)]
pub struct StreamChoice {
    pub delta: StreamDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Incremental content delta within a streaming chunk.
#[derive(Debug, Deserialize)]
pub struct StreamDelta {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_request_serialization() {
        let request = ApiRequest {
            model: "gpt-4o".to_string(),
            messages: vec![ApiMessage::user("Hello!")],
            temperature: Some(0.5),
            max_tokens: Some(500),
            stream: false,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("gpt-4o"));
        assert!(json.contains("Hello!"));
        assert!(json.contains("0.5"));
        assert!(json.contains("\"stream\":false"));
    }

    #[test]
    fn test_api_request_omits_unset_options() {
        let request = ApiRequest {
            model: "gpt-4o".to_string(),
            messages: vec![],
            temperature: None,
            max_tokens: None,
            stream: true,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("temperature"));
        assert!(!json.contains("max_tokens"));
        assert!(json.contains("\"stream\":true"));
    }

    #[test]
    fn test_api_response_parsing() {
        let json = r#"{
            "id": "chatcmpl-123",
            "choices": [
                {
                    "index": 0,
                    "message": {"role": "assistant", "content": "Hi there!"},
                    "finish_reason": "stop"
                }
            ],
            "usage": {
                "prompt_tokens": 12,
                "completion_tokens": 4,
                "total_tokens": 16
            }
        }"#;

        let response: ApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices.len(), 1);
        assert_eq!(response.choices[0].message.content, "Hi there!");
        assert_eq!(response.choices[0].finish_reason.as_deref(), Some("stop"));
        assert_eq!(response.usage.as_ref().unwrap().total_tokens, 16);
    }

    #[test]
    fn test_api_response_without_usage() {
        let json = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "ok"}}
            ]
        }"#;

        let response: ApiResponse = serde_json::from_str(json).unwrap();
        assert!(response.usage.is_none());
    }

    #[test]
    fn test_stream_chunk_with_content() {
        let json = r#"{
            "choices": [
                {"delta": {"content": "Hel"}, "finish_reason": null}
            ]
        }"#;

        let chunk: StreamChunk = serde_json::from_str(json).unwrap();
        assert_eq!(chunk.choices[0].delta.content.as_deref(), Some("Hel"));
        assert!(chunk.choices[0].finish_reason.is_none());
    }

    #[test]
    fn test_stream_chunk_role_only() {
        // First chunk of a stream carries the role and no content
        let json = r#"{
            "choices": [
                {"delta": {"role": "assistant"}, "finish_reason": null}
            ]
        }"#;

        let chunk: StreamChunk = serde_json::from_str(json).unwrap();
        assert!(chunk.choices[0].delta.content.is_none());
        assert_eq!(chunk.choices[0].delta.role.as_deref(), Some("assistant"));
    }

    #[test]
    fn test_message_helpers() {
        assert_eq!(ApiMessage::user("q").role, "user");
        assert_eq!(ApiMessage::assistant("a").role, "assistant");
    }

    #[test]
    fn test_api_message_roundtrip() {
        let msg = ApiMessage::user("Test message");
        let json = serde_json::to_string(&msg).unwrap();
        let parsed: ApiMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }
}
