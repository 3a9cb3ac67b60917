//! # gptchat-chat
//!
//! Interactive terminal chat against an OpenAI-compatible completions API.
//!
//! This crate provides:
//! - [`OpenAiProvider`] - HTTP client for the chat-completions endpoint
//! - [`CompletionProvider`] - Trait abstracting completion backends
//! - [`ChatSession`] - The interactive chat loop with transcript capture
//! - [`Transcript`] - Session transcript formatting and persistence
//! - Title and summary generation for saved chats
//!
//! ## Example
//!
//! ```no_run
//! use gptchat_chat::{ChatConfig, OpenAiProvider, provider::CompletionProvider};
//! use gptchat_chat::openai_api_types::ApiMessage;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ChatConfig::default();
//!     let provider = OpenAiProvider::from_config(config)?;
//!
//!     let messages = vec![ApiMessage::user("Hello!")];
//!     let completion = provider.complete(&messages, Default::default()).await?;
//!     println!("{}", completion.text);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod openai_api;
pub mod openai_api_types;
pub mod provider;
pub mod repl;
pub mod session;
pub mod title;

// Re-export main types
pub use config::ChatConfig;
pub use error::{ChatError, Result};
pub use openai_api::OpenAiProvider;
pub use provider::{Completion, CompletionOptions, CompletionProvider, MockProvider};
pub use repl::{ChatArgs, ChatSession};
pub use session::{Transcript, list_saved_chats, load_history, save_transcript};
pub use title::{generate_title, summarize_chat};
