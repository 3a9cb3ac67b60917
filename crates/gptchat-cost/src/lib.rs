//! # gptchat-cost
//!
//! Token usage logging and spend estimation for gptchat.
//!
//! This crate provides:
//! - [`UsageLogger`] - Append one line per completed API request to the usage log
//! - [`Aggregator`] - Parse the usage log, filter by date window, and price token totals
//! - [`PriceTable`] - Static per-model price-per-1000-tokens lookup
//!
//! ## Log Format
//!
//! The usage log is an append-only UTF-8 text file with one line per request:
//!
//! ```text
//! [2024-06-01 14:32:07] Model: gpt-4o | Tokens used: 187
//! ```
//!
//! Timestamps are local time at second precision. Parsing is best-effort:
//! malformed lines are skipped with a diagnostic and never abort a scan.
//!
//! ## Example
//!
//! ```no_run
//! use gptchat_cost::{Aggregator, Spend, UsageLogger};
//!
//! fn main() -> anyhow::Result<()> {
//!     let log_path = gptchat_core::usage_log_path()?;
//!
//!     // Record a completed request
//!     let logger = UsageLogger::new(&log_path);
//!     logger.log_usage("gpt-4o", 187)?;
//!
//!     // Estimate spend over the default window (last 30 days)
//!     let aggregator = Aggregator::new(&log_path);
//!     match aggregator.calculate_spent(None, None)? {
//!         Spend::Report(report) => print!("{}", report.render()),
//!         Spend::NoData { start, end } => {
//!             println!("No token usage found from {} to {}.", start.date(), end.date());
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod error;
pub mod logger;
pub mod models;
pub mod parser;
pub mod pricing;

// Re-export main types
pub use aggregator::{Aggregator, Spend, parse_end_bound, parse_start_bound};
pub use error::{CostError, Result};
pub use logger::UsageLogger;
pub use models::{CostReport, ModelCost, UsageRecord, UsageTotals};
pub use parser::{LineError, parse_line};
pub use pricing::PriceTable;
