//! Static per-model pricing.

use std::collections::HashMap;

/// Default prices in USD per 1000 tokens.
const DEFAULT_PRICES: &[(&str, f64)] = &[
    ("gpt-4o", 0.005),
    ("gpt-4", 0.03),
    ("gpt-4-turbo", 0.01),
    ("gpt-3.5-turbo", 0.0005),
];

/// Immutable model → price-per-1000-tokens lookup.
///
/// A model absent from the table prices at zero. That is deliberate: the
/// log accepts any model identifier, and an unpriced model must still show
/// up in the breakdown with its true token count rather than fail the run.
/// The reported total silently undercounts in that case.
#[derive(Debug, Clone)]
pub struct PriceTable {
    prices: HashMap<String, f64>,
}

impl PriceTable {
    /// Create a table with the default prices.
    pub fn new() -> Self {
        Self {
            prices: DEFAULT_PRICES
                .iter()
                .map(|(model, price)| (model.to_string(), *price))
                .collect(),
        }
    }

    /// Create a table from custom prices.
    pub fn with_prices(prices: HashMap<String, f64>) -> Self {
        Self { prices }
    }

    /// Price in USD per 1000 tokens, or 0.0 for an unknown model.
    pub fn price_per_1k(&self, model: &str) -> f64 {
        self.prices.get(model).copied().unwrap_or(0.0)
    }

    /// Cost in USD for `tokens` tokens of `model`.
    pub fn cost(&self, model: &str, tokens: u64) -> f64 {
        tokens as f64 * self.price_per_1k(model) / 1000.0
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::new()
    }
}
