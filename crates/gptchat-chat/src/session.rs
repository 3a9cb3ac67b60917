//! Chat transcript capture and persistence.
//!
//! Transcripts are plain text, one stamped line per side of an exchange:
//!
//! ```text
//! [14:32:01] You: What is a borrow checker?
//! [14:32:07] Assistant: It is the part of the compiler that...
//! ```
//!
//! With markdown output enabled, assistant replies are fenced in code
//! blocks so saved `.md` transcripts render verbatim. Saved chats live in
//! the chats directory as `chat_<title>_<stamp>.md` or `.txt`, and can be
//! re-loaded into a new session by re-deriving the message roles from the
//! stamped lines.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{info, warn};

use crate::error::Result;
use crate::openai_api_types::ApiMessage;

/// Marker preceding user content in a transcript line.
const USER_MARKER: &str = "] You:";

/// Marker preceding assistant content in a transcript line.
const ASSISTANT_MARKER: &str = "] Assistant:";

/// Section header appended before an auto-generated summary.
const SUMMARY_HEADER: &str = "--- Chat Summary ---";

/// Accumulates the session transcript in memory.
///
/// Nothing touches disk until [`save_transcript`]; a discarded session
/// leaves no file behind.
#[derive(Debug, Clone)]
pub struct Transcript {
    markdown: bool,
    content: String,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new(markdown: bool) -> Self {
        Self {
            markdown,
            content: String::new(),
        }
    }

    /// Record one exchange stamped with the current local time.
    pub fn record_exchange(&mut self, user: &str, assistant: &str) {
        let stamp = Local::now().format("[%H:%M:%S]").to_string();
        self.record_exchange_with_stamp(&stamp, user, assistant);
    }

    /// Record one exchange with an explicit time stamp.
    pub fn record_exchange_with_stamp(&mut self, stamp: &str, user: &str, assistant: &str) {
        let formatted = if self.markdown {
            format!("\n\n```\n{}\n```\n", assistant)
        } else {
            assistant.to_string()
        };
        self.content.push_str(&format!(
            "\n{} You: {}\n{} Assistant: {}\n",
            stamp, user, stamp, formatted
        ));
    }

    /// True if no exchanges have been recorded.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// The transcript text accumulated so far.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether assistant replies are fenced for markdown.
    pub fn markdown(&self) -> bool {
        self.markdown
    }
}

/// Timestamp used in saved-chat filenames, e.g. `20240601-143207`.
pub fn session_stamp() -> String {
    Local::now().format("%Y%m%d-%H%M%S").to_string()
}

/// List saved chat transcripts (`chat_*.md` and `chat_*.txt`) in `dir`,
/// sorted by filename.
pub fn list_saved_chats(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !dir.exists() {
        return Ok(files);
    }

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let is_transcript = path
            .extension()
            .is_some_and(|ext| ext == "md" || ext == "txt");
        if name.starts_with("chat_") && is_transcript {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Re-derive the message list from a saved transcript.
///
/// Only stamped `You:`/`Assistant:` lines become messages; everything else
/// (fences, blank lines, the summary section) is skipped. Multi-line
/// replies therefore load as their first line only, matching the
/// transcript's line-oriented format.
pub fn load_history(path: &Path) -> Result<Vec<ApiMessage>> {
    let content = std::fs::read_to_string(path)?;
    let mut messages = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if !line.starts_with('[') {
            continue;
        }
        if let Some((_, content)) = line.rsplit_once(USER_MARKER) {
            messages.push(ApiMessage::user(content.trim()));
        } else if let Some((_, content)) = line.rsplit_once(ASSISTANT_MARKER) {
            messages.push(ApiMessage::assistant(content.trim()));
        }
    }

    info!(path = %path.display(), messages = messages.len(), "loaded chat history");
    Ok(messages)
}

/// Persist a finished transcript into `dir`.
///
/// The transcript is written to a temp file first, the summary section is
/// appended when present, and the file is renamed into place as
/// `chat_<title>_<stamp>.<ext>`. Returns the final path.
pub fn save_transcript(
    dir: &Path,
    title: &str,
    stamp: &str,
    transcript: &Transcript,
    summary: Option<&str>,
) -> Result<PathBuf> {
    let temp_path = dir.join(format!("temp_chat_log_{}.txt", stamp));

    let mut content = transcript.content().to_string();
    if let Some(summary) = summary {
        content.push_str(&format!("\n\n{}\n{}", SUMMARY_HEADER, summary));
    }
    std::fs::write(&temp_path, &content)?;

    let extension = if transcript.markdown() { "md" } else { "txt" };
    let final_path = dir.join(format!("chat_{}_{}.{}", sanitize_title(title), stamp, extension));
    if let Err(e) = std::fs::rename(&temp_path, &final_path) {
        warn!(error = %e, "failed to finalize transcript, removing temp file");
        let _ = std::fs::remove_file(&temp_path);
        return Err(e.into());
    }

    info!(path = %final_path.display(), "saved chat transcript");
    Ok(final_path)
}

/// Keep titles filesystem-safe: path separators and whitespace become
/// underscores.
fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect()
}
