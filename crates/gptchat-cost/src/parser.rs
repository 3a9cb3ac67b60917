//! Best-effort usage log line parser.
//!
//! Grammar (one line per request, written by [`crate::UsageLogger`]):
//!
//! ```text
//! [YYYY-MM-DD HH:MM:SS] Model: <model-id> | Tokens used: <int>
//! ```
//!
//! Parsing is fault-tolerant by contract: a line that lacks the field
//! markers is skipped silently, and a line whose timestamp or token count
//! fails to parse produces a [`LineError`] the caller is expected to warn
//! about and move past. No line ever aborts a scan.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::models::UsageRecord;

/// Timestamp format used in the usage log (local time, second precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Substring that must be present for a line to be considered at all.
const MODEL_MARKER: &str = "Model:";

/// Marker the model identifier follows, up to the next `|`.
const MODEL_FIELD: &str = "Model: ";

/// Marker the token count follows, to end of line.
const TOKENS_MARKER: &str = "Tokens used:";

/// Why a candidate line failed to parse.
///
/// These cover lines that carry both field markers but are malformed in a
/// field, which is the recovered-locally case: skip, diagnose, continue.
#[derive(Debug, Error)]
pub enum LineError {
    /// No `[...]`-bracketed prefix to read a timestamp from
    #[error("timestamp is not bracketed")]
    MissingTimestamp,

    /// Bracketed prefix present but not a valid timestamp
    #[error("invalid timestamp {value:?}: {source}")]
    InvalidTimestamp {
        value: String,
        source: chrono::ParseError,
    },

    /// `Model:` marker present but not as a `Model: ` field
    #[error("model field marker not followed by a value")]
    MissingModel,

    /// `Tokens used:` marker not found after the model field
    #[error("token count marker not found after model field")]
    MissingTokens,

    /// Token count present but not a base-10 non-negative integer
    #[error("invalid token count {value:?}: {source}")]
    InvalidTokens {
        value: String,
        source: std::num::ParseIntError,
    },
}

/// Parse a single usage log line.
///
/// Returns `Ok(Some(record))` for a well-formed line, `Ok(None)` for a
/// blank line or one without both field markers, and `Err` for a line that
/// looked like a usage line but had a malformed field.
pub fn parse_line(line: &str) -> Result<Option<UsageRecord>, LineError> {
    parse_line_within(line, None)
}

/// Parse a single usage log line, discarding records outside `window`.
///
/// The window check runs immediately after the timestamp parses and before
/// the model and token fields are extracted, so an out-of-window line with
/// a mangled token count is discarded silently rather than diagnosed.
/// Bounds are inclusive on both ends.
pub fn parse_line_within(
    line: &str,
    window: Option<(NaiveDateTime, NaiveDateTime)>,
) -> Result<Option<UsageRecord>, LineError> {
    let line = line.trim();
    if line.is_empty() || !line.contains(MODEL_MARKER) || !line.contains(TOKENS_MARKER) {
        return Ok(None);
    }

    // Timestamp: text between the first '[' and the first ']'
    let open = line.find('[').ok_or(LineError::MissingTimestamp)?;
    let close = line
        .find(']')
        .filter(|close| *close > open)
        .ok_or(LineError::MissingTimestamp)?;
    let value = &line[open + 1..close];
    let timestamp = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|source| {
        LineError::InvalidTimestamp {
            value: value.to_string(),
            source,
        }
    })?;

    if let Some((start, end)) = window
        && (timestamp < start || timestamp > end)
    {
        return Ok(None);
    }

    // Model: text after the first "Model: ", up to the next '|'
    let after_model = line
        .find(MODEL_FIELD)
        .map(|i| &line[i + MODEL_FIELD.len()..])
        .ok_or(LineError::MissingModel)?;
    let model = match after_model.find('|') {
        Some(i) => &after_model[..i],
        None => after_model,
    }
    .trim();

    // Tokens: text after "Tokens used:", to end of line
    let tokens_text = after_model
        .find(TOKENS_MARKER)
        .map(|i| after_model[i + TOKENS_MARKER.len()..].trim())
        .ok_or(LineError::MissingTokens)?;
    let tokens: u64 = tokens_text
        .parse()
        .map_err(|source| LineError::InvalidTokens {
            value: tokens_text.to_string(),
            source,
        })?;

    Ok(Some(UsageRecord::new(timestamp, model, tokens)))
}
