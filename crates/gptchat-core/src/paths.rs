//! Well-known filesystem locations for gptchat.
//!
//! All state lives under `~/.gptchat/`:
//!
//! - `token_usage.log` - append-only usage log (one line per API request)
//! - `chats/` - saved chat transcripts
//! - `config.yaml` - optional user configuration
//! - `logs/` - application logs

use std::path::PathBuf;

use crate::error::{CoreError, Result};

/// Root data directory, `~/.gptchat`. Created if absent.
pub fn data_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(CoreError::MissingHome)?;
    let dir = home.join(".gptchat");
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| CoreError::DirectoryCreation {
            path: dir.clone(),
            source: e,
        })?;
    }
    Ok(dir)
}

/// Directory holding saved chat transcripts, `~/.gptchat/chats`. Created if absent.
pub fn chats_dir() -> Result<PathBuf> {
    let dir = data_dir()?.join("chats");
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| CoreError::DirectoryCreation {
            path: dir.clone(),
            source: e,
        })?;
    }
    Ok(dir)
}

/// Path of the append-only token usage log, `~/.gptchat/token_usage.log`.
///
/// The file itself is created lazily by the usage logger on first append;
/// only the parent directory is ensured here.
pub fn usage_log_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("token_usage.log"))
}

/// Path of the optional user configuration file, `~/.gptchat/config.yaml`.
pub fn config_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("config.yaml"))
}
