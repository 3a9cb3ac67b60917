//! Data models for usage accounting.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One parsed usage log line: a request that completed at `timestamp`,
/// against `model`, consuming `tokens` tokens.
///
/// A record is only materialized when all three fields parsed cleanly;
/// anything less is skipped at the parser level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Completion time of the request, local time, second precision
    pub timestamp: NaiveDateTime,

    /// Model identifier as written to the log (free text, not a closed set)
    pub model: String,

    /// Total tokens consumed by the request
    pub tokens: u64,
}

impl UsageRecord {
    /// Create a new usage record.
    pub fn new(timestamp: NaiveDateTime, model: impl Into<String>, tokens: u64) -> Self {
        Self {
            timestamp,
            model: model.into(),
            tokens,
        }
    }
}

/// Per-model token sums, preserving first-appearance order.
///
/// The report lists models in the order they first occur in the log, so the
/// accumulator keeps a plain vector instead of a hash map. Model counts are
/// tiny in practice; the linear lookup is not a concern.
#[derive(Debug, Clone, Default)]
pub struct UsageTotals {
    entries: Vec<(String, u64)>,
}

impl UsageTotals {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `tokens` to the running total for `model`.
    pub fn add(&mut self, model: &str, tokens: u64) {
        if let Some((_, total)) = self.entries.iter_mut().find(|(m, _)| m == model) {
            *total += tokens;
        } else {
            self.entries.push((model.to_string(), tokens));
        }
    }

    /// True if no records have been accumulated.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct models seen.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Total for a single model, if seen.
    pub fn get(&self, model: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(m, _)| m == model)
            .map(|(_, t)| *t)
    }

    /// Iterate `(model, tokens)` pairs in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(m, t)| (m.as_str(), *t))
    }
}

/// One line of the cost breakdown: a model, its token total, and its cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCost {
    /// Model name
    pub model: String,

    /// Accumulated tokens for the window
    pub tokens: u64,

    /// Estimated cost in USD (`tokens * price_per_1k / 1000`)
    pub cost_usd: f64,
}

/// Priced usage summary for an aggregation window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostReport {
    /// Inclusive lower bound of the window
    pub start: NaiveDateTime,

    /// Inclusive upper bound of the window
    pub end: NaiveDateTime,

    /// Per-model breakdown, in first-appearance order
    pub lines: Vec<ModelCost>,

    /// Sum of all per-model costs in USD
    pub total_cost_usd: f64,

    /// Malformed log lines skipped during the scan
    pub skipped_lines: usize,
}

impl CostReport {
    /// Render the report in its textual form.
    ///
    /// Costs are formatted to four decimal places with Rust's default float
    /// rounding; dates in the total line are shown as `YYYY-MM-DD`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("\n--- Token Usage Breakdown ---\n");
        for line in &self.lines {
            out.push_str(&format!(
                "{}: {} tokens -> ${:.4}\n",
                line.model, line.tokens, line.cost_usd
            ));
        }
        out.push_str(&format!(
            "\nTotal cost from {} to {}: ${:.4}\n",
            self.start.date(),
            self.end.date(),
            self.total_cost_usd
        ));
        out
    }
}
