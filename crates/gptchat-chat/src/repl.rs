//! The interactive chat loop.
//!
//! [`ChatSession`] holds the conversation state and is fully driveable
//! from tests through [`crate::MockProvider`]; [`run_chat`] wires it to
//! the terminal: prompts, streaming display, and the save-or-discard flow
//! on exit.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use crossterm::style::Stylize;
use futures_util::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

use gptchat_cost::UsageLogger;

use crate::config::ChatConfig;
use crate::error::Result;
use crate::openai_api::OpenAiProvider;
use crate::openai_api_types::ApiMessage;
use crate::provider::CompletionProvider;
use crate::session::{Transcript, list_saved_chats, load_history, save_transcript, session_stamp};
use crate::title::{generate_title, summarize_chat};

/// Options carried in from the command line; `None` fields are asked for
/// interactively.
#[derive(Debug, Clone, Default)]
pub struct ChatArgs {
    /// Model override; skips the model prompt when set.
    pub model: Option<String>,

    /// Markdown transcript output; skips the markdown prompt when set.
    pub markdown: Option<bool>,

    /// Jump straight into the history-loading menu.
    pub load: bool,
}

/// One interactive chat session: conversation state, transcript, and the
/// usage log hook.
pub struct ChatSession {
    provider: Box<dyn CompletionProvider>,
    messages: Vec<ApiMessage>,
    transcript: Transcript,
    usage_logger: UsageLogger,
}

impl ChatSession {
    /// Create a session over `provider`, logging usage to `usage_log_path`.
    pub fn new(
        provider: Box<dyn CompletionProvider>,
        markdown: bool,
        usage_log_path: impl AsRef<Path>,
    ) -> Self {
        Self {
            provider,
            messages: Vec::new(),
            transcript: Transcript::new(markdown),
            usage_logger: UsageLogger::new(usage_log_path),
        }
    }

    /// Seed the conversation with messages loaded from saved transcripts.
    pub fn preload(&mut self, history: Vec<ApiMessage>) {
        self.messages.extend(history);
    }

    /// Number of messages currently in the conversation.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// True if at least one exchange completed this session.
    pub fn has_exchanges(&self) -> bool {
        !self.transcript.is_empty()
    }

    /// Submit one user turn: stream the reply through `on_delta`, record
    /// the exchange, and log token usage for the completed request.
    ///
    /// On a streaming failure the user message is rolled back so the next
    /// attempt starts from a clean conversation.
    pub async fn submit(
        &mut self,
        input: &str,
        on_delta: &mut dyn FnMut(&str),
    ) -> Result<String> {
        self.messages.push(ApiMessage::user(input));

        let mut stream = match self
            .provider
            .stream_reply(&self.messages, Default::default())
            .await
        {
            Ok(stream) => stream,
            Err(e) => {
                self.messages.pop();
                return Err(e);
            }
        };

        let mut reply = String::new();
        while let Some(delta) = stream.next().await {
            match delta {
                Ok(delta) => {
                    on_delta(&delta);
                    reply.push_str(&delta);
                }
                Err(e) => {
                    self.messages.pop();
                    return Err(e);
                }
            }
        }
        drop(stream);

        self.messages.push(ApiMessage::assistant(reply.clone()));
        self.transcript.record_exchange(input, &reply);

        // The streaming response carries no usage totals; probe with a
        // non-streaming call over the full conversation and log its count.
        match self.provider.complete(&self.messages, Default::default()).await {
            Ok(completion) => {
                if let Some(total_tokens) = completion.total_tokens {
                    if let Err(e) = self
                        .usage_logger
                        .log_usage(self.provider.model(), u64::from(total_tokens))
                    {
                        warn!(error = %e, "failed to append usage log entry");
                    }
                } else {
                    warn!("usage probe returned no token total");
                }
            }
            Err(e) => {
                warn!(error = %e.friendly_message(), "usage probe failed, skipping usage log entry");
            }
        }

        Ok(reply)
    }

    /// Finish the session: when `save` is set and exchanges happened,
    /// generate a title and summary and persist the transcript into
    /// `chats_dir`. Returns the saved path, if any.
    pub async fn finish(&self, save: bool, chats_dir: &Path) -> Result<Option<PathBuf>> {
        if !save || self.transcript.is_empty() {
            return Ok(None);
        }

        let title = generate_title(self.provider.as_ref(), &self.messages).await;
        let summary = summarize_chat(self.provider.as_ref(), &self.messages).await;
        let path = save_transcript(
            chats_dir,
            &title,
            &session_stamp(),
            &self.transcript,
            summary.as_deref(),
        )?;
        Ok(Some(path))
    }
}

/// Line-oriented terminal input.
struct TerminalInput {
    lines: Lines<BufReader<Stdin>>,
}

impl TerminalInput {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Ask a question and read one line; `None` on end of input.
    async fn ask(&mut self, question: &str) -> Result<Option<String>> {
        print!("{} ", question);
        std::io::stdout().flush()?;
        Ok(self.lines.next_line().await?)
    }

    /// Ask a yes/no question; end of input counts as "no".
    async fn confirm(&mut self, question: &str) -> Result<bool> {
        loop {
            match self.ask(&format!("{} (y/n):", question)).await? {
                None => return Ok(false),
                Some(answer) => match answer.trim().to_lowercase().as_str() {
                    "y" | "yes" => return Ok(true),
                    "n" | "no" => return Ok(false),
                    _ => println!("Please answer y or n."),
                },
            }
        }
    }
}

/// Run the interactive chat command.
pub async fn run_chat(args: ChatArgs) -> Result<()> {
    let config_path = gptchat_core::config_path()?;
    let mut config = ChatConfig::load_or_default(&config_path)?;

    println!("{}", "=== GPT Terminal Chat ===".magenta().bold());

    let mut input = TerminalInput::new();

    let markdown = match args.markdown {
        Some(markdown) => markdown,
        None => input.confirm("Do you want Markdown transcript output?").await?,
    };
    config.markdown_output = markdown;

    let history = if args.load || input.confirm("Do you want to load previous chats?").await? {
        select_history(&mut input).await?
    } else {
        Vec::new()
    };

    if let Some(model) = args.model {
        config.model = model;
    } else if let Some(answer) = input
        .ask(&format!(
            "Which model do you want to use? (default {}):",
            config.model
        ))
        .await?
        && !answer.trim().is_empty()
    {
        config.model = answer.trim().to_string();
    }

    let provider = OpenAiProvider::from_config(config.clone())?;
    let usage_log_path = gptchat_core::usage_log_path()?;
    let mut session = ChatSession::new(Box::new(provider), markdown, usage_log_path);
    session.preload(history);

    info!(model = %config.model, markdown, "chat session started");

    loop {
        let Some(line) = input.ask(&format!("{}:", "You".cyan().bold())).await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line.to_lowercase().as_str(), "exit" | "quit") {
            println!("{}", "Exiting chat...".red());
            break;
        }

        print!("\n{}: ", "Assistant".green().bold());
        std::io::stdout().flush()?;

        let mut print_delta = |delta: &str| {
            print!("{}", delta);
            let _ = std::io::stdout().flush();
        };
        match session.submit(line, &mut print_delta).await {
            Ok(_) => println!("\n"),
            Err(e) => {
                println!();
                println!("{}", e.friendly_message().red());
            }
        }
    }

    if !session.has_exchanges() {
        return Ok(());
    }

    let save = input.confirm("Do you want to save this chat?").await?;
    if save {
        println!("{}", "Generating a chat title and summary...".cyan());
    }
    match session.finish(save, &gptchat_core::chats_dir()?).await? {
        Some(path) => println!("{} {}", "Chat saved as".green(), path.display()),
        None => println!("{}", "Chat discarded. Nothing saved.".red()),
    }

    Ok(())
}

/// Show the saved-chat menu and load the selected transcripts.
async fn select_history(input: &mut TerminalInput) -> Result<Vec<ApiMessage>> {
    let chats_dir = gptchat_core::chats_dir()?;
    let files = list_saved_chats(&chats_dir)?;
    if files.is_empty() {
        println!("{}", "No chat logs found. Starting fresh.".yellow());
        return Ok(Vec::new());
    }

    println!("\n{}", "Available chat files:".yellow().bold());
    for (index, file) in files.iter().enumerate() {
        println!("{}. {}", index + 1, file.display());
    }

    let Some(answer) = input
        .ask("\nEnter file numbers to load, separated by commas (e.g., 1,3):")
        .await?
    else {
        return Ok(Vec::new());
    };

    let mut history = Vec::new();
    let mut loaded = 0usize;
    for token in answer.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let Ok(number) = token.parse::<usize>() else {
            println!("Skipping invalid selection: {}", token);
            continue;
        };
        let Some(path) = number.checked_sub(1).and_then(|i| files.get(i)) else {
            println!("Skipping out-of-range selection: {}", token);
            continue;
        };
        match load_history(path) {
            Ok(messages) => {
                history.extend(messages);
                loaded += 1;
            }
            Err(e) => println!("Could not load {}: {}", path.display(), e),
        }
    }

    if loaded > 0 {
        println!(
            "{}",
            format!("Loaded {} chat(s) into current session.", loaded).green()
        );
    }
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockProvider;

    fn session_with(mock: MockProvider, dir: &Path) -> ChatSession {
        ChatSession::new(Box::new(mock), false, dir.join("token_usage.log"))
    }

    #[tokio::test]
    async fn test_submit_streams_and_records() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockProvider::new()
            .with_response("streamed reply")
            .with_response("probe reply");
        let mut session = session_with(mock, dir.path());

        let mut deltas = Vec::new();
        let mut collect = |delta: &str| deltas.push(delta.to_string());
        let reply = session.submit("hello", &mut collect).await.unwrap();

        assert_eq!(reply, "streamed reply");
        assert_eq!(deltas.concat(), "streamed reply");
        // user + assistant
        assert_eq!(session.message_count(), 2);
        assert!(session.has_exchanges());
    }

    #[tokio::test]
    async fn test_submit_appends_usage_log_line() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockProvider::new().with_total_tokens(Some(187));
        let mut session = session_with(mock, dir.path());

        let mut sink = |_: &str| {};
        session.submit("hello", &mut sink).await.unwrap();

        let content = std::fs::read_to_string(dir.path().join("token_usage.log")).unwrap();
        assert!(content.contains("Model: mock-model | Tokens used: 187"));
        assert_eq!(content.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_submit_without_usage_total_skips_logging() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockProvider::new().with_total_tokens(None);
        let mut session = session_with(mock, dir.path());

        let mut sink = |_: &str| {};
        session.submit("hello", &mut sink).await.unwrap();

        assert!(!dir.path().join("token_usage.log").exists());
    }

    #[tokio::test]
    async fn test_preloaded_history_counts() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_with(MockProvider::new(), dir.path());
        session.preload(vec![
            ApiMessage::user("earlier question"),
            ApiMessage::assistant("earlier answer"),
        ]);
        assert_eq!(session.message_count(), 2);
        assert!(!session.has_exchanges());
    }

    #[tokio::test]
    async fn test_finish_without_save_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockProvider::new();
        let mut session = session_with(mock, dir.path());

        let mut sink = |_: &str| {};
        session.submit("hello", &mut sink).await.unwrap();

        let saved = session.finish(false, dir.path()).await.unwrap();
        assert!(saved.is_none());
        assert!(list_saved_chats(dir.path()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_finish_saves_titled_transcript_with_summary() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockProvider::new()
            .with_response("the reply")      // streamed reply
            .with_response("probe")          // usage probe
            .with_response("Ownership And Borrowing") // title
            .with_response("We discussed ownership."); // summary
        let mut session = session_with(mock, dir.path());

        let mut sink = |_: &str| {};
        session.submit("explain ownership", &mut sink).await.unwrap();

        let saved = session.finish(true, dir.path()).await.unwrap().unwrap();
        let name = saved.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("chat_Ownership_And_Borrowing_"));
        assert!(name.ends_with(".txt"));

        let content = std::fs::read_to_string(&saved).unwrap();
        assert!(content.contains("You: explain ownership"));
        assert!(content.contains("Assistant: the reply"));
        assert!(content.contains("--- Chat Summary ---"));
        assert!(content.contains("We discussed ownership."));
    }

    #[tokio::test]
    async fn test_finish_empty_session_saves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let session = session_with(MockProvider::new(), dir.path());

        let saved = session.finish(true, dir.path()).await.unwrap();
        assert!(saved.is_none());
    }
}
