//! Usage log writer.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::debug;

use crate::error::Result;
use crate::parser::TIMESTAMP_FORMAT;

/// Appends one line per completed API request to the usage log.
///
/// Line format:
///
/// ```text
/// [2024-06-01 14:32:07] Model: gpt-4o | Tokens used: 187
/// ```
///
/// The file is created on first append. Writes use platform append mode
/// only; concurrent writers may interleave but never truncate.
pub struct UsageLogger {
    path: PathBuf,
}

impl UsageLogger {
    /// Create a logger writing to `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the usage log.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one usage line stamped with the current local time.
    pub fn log_usage(&self, model: &str, tokens: u64) -> Result<()> {
        self.log_usage_at(Local::now().naive_local(), model, tokens)
    }

    /// Append one usage line with an explicit timestamp.
    pub fn log_usage_at(&self, timestamp: NaiveDateTime, model: &str, tokens: u64) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        writeln!(
            file,
            "[{}] Model: {} | Tokens used: {}",
            timestamp.format(TIMESTAMP_FORMAT),
            model,
            tokens
        )?;

        debug!(model, tokens, path = %self.path.display(), "logged token usage");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_line;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn test_append_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token_usage.log");
        let logger = UsageLogger::new(&path);

        assert!(!path.exists());
        logger
            .log_usage_at(ts("2024-06-01 14:32:07"), "gpt-4o", 187)
            .unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "[2024-06-01 14:32:07] Model: gpt-4o | Tokens used: 187\n");
    }

    #[test]
    fn test_appends_do_not_truncate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token_usage.log");
        let logger = UsageLogger::new(&path);

        logger.log_usage_at(ts("2024-06-01 10:00:00"), "gpt-4o", 100).unwrap();
        logger.log_usage_at(ts("2024-06-01 11:00:00"), "gpt-4", 200).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("gpt-4o"));
        assert!(lines[1].contains("gpt-4"));
    }

    #[test]
    fn test_written_lines_parse_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token_usage.log");
        let logger = UsageLogger::new(&path);

        logger
            .log_usage_at(ts("2024-06-01 14:32:07"), "gpt-4-turbo", 512)
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let record = parse_line(content.trim_end()).unwrap().unwrap();
        assert_eq!(record.timestamp, ts("2024-06-01 14:32:07"));
        assert_eq!(record.model, "gpt-4-turbo");
        assert_eq!(record.tokens, 512);
    }
}
