//! Text-generation settings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Fallback price per 1K tokens for models missing from the pricing table.
pub const DEFAULT_PRICE_PER_1K: f64 = 0.002;

/// Text-generation provider settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Provider label recorded on cost records.
    pub provider: String,
    /// Model used for new drafts.
    pub model: String,
    /// Price in USD per 1K tokens, keyed by model.
    pub pricing: BTreeMap<String, f64>,
    /// Token count charged for simulated (fallback) generations.
    pub simulated_tokens: i64,
}

impl GenerationSettings {
    /// Price per 1K tokens for `model`, falling back to [`DEFAULT_PRICE_PER_1K`].
    pub fn price_per_1k(&self, model: &str) -> f64 {
        self.pricing
            .get(model)
            .copied()
            .unwrap_or(DEFAULT_PRICE_PER_1K)
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        let pricing = [
            ("gpt-3.5-turbo", 0.002),
            ("gpt-3.5-turbo-instruct", 0.0015),
            ("gpt-4", 0.03),
            ("gpt-4-turbo-preview", 0.01),
        ]
        .into_iter()
        .map(|(model, price)| (model.to_string(), price))
        .collect();

        Self {
            provider: "openai".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            pricing,
            simulated_tokens: 800,
        }
    }
}
