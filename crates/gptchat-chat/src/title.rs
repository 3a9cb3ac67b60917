//! Auto-generated titles and summaries for saved chats.
//!
//! Both run as ordinary completion calls over the conversation so far,
//! with cooler sampling and tight token budgets. Failures are soft: a
//! failed title falls back to a timestamp name, a failed summary is
//! simply omitted.

use chrono::Local;
use tracing::warn;

use crate::openai_api_types::ApiMessage;
use crate::provider::{CompletionOptions, CompletionProvider};

/// Prompt appended to the conversation to elicit a title.
const TITLE_PROMPT: &str = "Based on this conversation, suggest a short 3-5 word title that \
     would best describe it. Return ONLY the title text without quotation marks or any prefix.";

/// Prompt appended to the conversation to elicit a summary.
const SUMMARIZE_PROMPT: &str = "Please summarize this conversation between the user and \
     assistant in a concise, clear manner. Focus on main topics discussed.";

/// Generate a short underscore-joined title for the conversation.
///
/// Falls back to `chat_<stamp>` when the completion call fails.
pub async fn generate_title(provider: &dyn CompletionProvider, messages: &[ApiMessage]) -> String {
    let mut prompt_messages = messages.to_vec();
    prompt_messages.push(ApiMessage::user(TITLE_PROMPT));

    let options = CompletionOptions::default()
        .with_temperature(0.5)
        .with_max_tokens(20);

    match provider.complete(&prompt_messages, options).await {
        Ok(completion) => completion.text.trim().replace(' ', "_"),
        Err(e) => {
            warn!(error = %e, "could not generate chat title");
            format!("chat_{}", Local::now().format("%Y%m%d-%H%M%S"))
        }
    }
}

/// Generate a concise summary of the conversation, or `None` if the
/// completion call fails.
pub async fn summarize_chat(
    provider: &dyn CompletionProvider,
    messages: &[ApiMessage],
) -> Option<String> {
    let mut prompt_messages = messages.to_vec();
    prompt_messages.push(ApiMessage::user(SUMMARIZE_PROMPT));

    let options = CompletionOptions::default()
        .with_temperature(0.3)
        .with_max_tokens(300);

    match provider.complete(&prompt_messages, options).await {
        Ok(completion) => Some(completion.text),
        Err(e) => {
            warn!(error = %e, "could not generate chat summary");
            None
        }
    }
}
