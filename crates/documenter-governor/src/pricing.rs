//! Token pricing.

use documenter_settings::GenerationSettings;

/// Cost in USD of `tokens` tokens on `model`.
///
/// Models missing from the pricing table use the default rate.
pub fn calculate_cost(model: &str, tokens: i64, generation: &GenerationSettings) -> f64 {
    tokens as f64 / 1000.0 * generation.price_per_1k(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_800_tokens() {
        let cost = calculate_cost("gpt-3.5-turbo", 800, &GenerationSettings::default());
        assert!((cost - 0.0016).abs() < 1e-12);
    }

    #[test]
    fn gpt4_rate() {
        let cost = calculate_cost("gpt-4", 2_000, &GenerationSettings::default());
        assert!((cost - 0.06).abs() < 1e-12);
    }

    #[test]
    fn unknown_model_falls_back() {
        let cost = calculate_cost("mystery-model", 1_000, &GenerationSettings::default());
        assert!((cost - 0.002).abs() < 1e-12);
    }

    #[test]
    fn zero_tokens_cost_nothing() {
        assert!(calculate_cost("gpt-4", 0, &GenerationSettings::default()).abs() < f64::EPSILON);
    }
}
