//! # gptchat-core
//!
//! Shared plumbing for the gptchat workspace.
//!
//! This crate provides:
//! - [`CoreError`] - the common error type for filesystem and setup failures
//! - [`logging`] - tracing bootstrap (JSON file logs + console)
//! - [`paths`] - well-known locations under `~/.gptchat/`

pub mod error;
pub mod logging;
pub mod paths;

pub use error::{CoreError, Result};
pub use logging::{LogGuard, init_logging, init_test_logging};
pub use paths::{chats_dir, config_path, data_dir, usage_log_path};
