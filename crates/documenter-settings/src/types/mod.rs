//! Settings type definitions.
//!
//! Every section implements [`Default`] with production values and is marked
//! `#[serde(default)]`, so a settings file only needs the keys it overrides.

mod generation;
mod review;

pub use generation::*;
pub use review::*;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type.
///
/// Example settings file:
///
/// ```json
/// {
///   "budget": { "monthly_budget": 120.0 },
///   "review": { "docs_dir": "/srv/documenter/docs" }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumenterSettings {
    /// Ledger database location and pool sizing.
    pub ledger: LedgerSettings,
    /// Monthly spend budget.
    pub budget: BudgetSettings,
    /// Text-generation provider, model and pricing.
    pub generation: GenerationSettings,
    /// File staging areas and review defaults.
    pub review: ReviewSettings,
    /// Pattern-learning limits and insight windows.
    pub learning: LearningSettings,
    /// Log output configuration.
    pub logging: LoggingSettings,
}

impl DocumenterSettings {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let budget = self.budget.monthly_budget;
        if !budget.is_finite() || budget <= 0.0 {
            return Err(SettingsError::InvalidValue(format!(
                "budget.monthly_budget must be a positive amount, got {budget}"
            )));
        }
        if self.ledger.pool_size == 0 {
            return Err(SettingsError::InvalidValue(
                "ledger.pool_size must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.review.default_quality_score) {
            return Err(SettingsError::InvalidValue(format!(
                "review.default_quality_score must be within [0, 1], got {}",
                self.review.default_quality_score
            )));
        }
        if self.generation.model.trim().is_empty() {
            return Err(SettingsError::InvalidValue(
                "generation.model must not be empty".into(),
            ));
        }
        if let Some((model, price)) = self
            .generation
            .pricing
            .iter()
            .find(|(_, p)| !p.is_finite() || **p < 0.0)
        {
            return Err(SettingsError::InvalidValue(format!(
                "generation.pricing.{model} must be a non-negative price, got {price}"
            )));
        }
        Ok(())
    }
}

/// Ledger database settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    /// Path to the `SQLite` ledger file.
    pub db_path: PathBuf,
    /// Maximum pooled connections.
    pub pool_size: u32,
    /// `SQLite` busy timeout in milliseconds.
    pub busy_timeout_ms: u32,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("documenter.db"),
            pool_size: 8,
            busy_timeout_ms: 5_000,
        }
    }
}

/// Budget settings for the cost governor.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetSettings {
    /// Monthly budget in USD.
    pub monthly_budget: f64,
}

impl Default for BudgetSettings {
    fn default() -> Self {
        Self {
            monthly_budget: 50.0,
        }
    }
}

/// Pattern-learning settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningSettings {
    /// Maximum number of stored patterns consulted per generated draft.
    pub max_applied_patterns: u32,
    /// Default window, in days, for insight generation.
    pub insight_window_days: u32,
    /// Review-time target quoted in the review-duration insight.
    pub target_review_minutes: f64,
}

impl Default for LearningSettings {
    fn default() -> Self {
        Self {
            max_applied_patterns: 10,
            insight_window_days: 7,
            target_review_minutes: 5.0,
        }
    }
}

/// Log output settings. `RUST_LOG` takes precedence over `level`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = DocumenterSettings::default();
        settings.validate().unwrap();
        assert!((settings.budget.monthly_budget - 50.0).abs() < f64::EPSILON);
        assert_eq!(settings.generation.model, "gpt-3.5-turbo");
        assert_eq!(settings.review.default_review_seconds, 300);
        assert_eq!(settings.learning.max_applied_patterns, 10);
    }

    #[test]
    fn zero_budget_rejected() {
        let mut settings = DocumenterSettings::default();
        settings.budget.monthly_budget = 0.0;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("monthly_budget"));
    }

    #[test]
    fn nan_budget_rejected() {
        let mut settings = DocumenterSettings::default();
        settings.budget.monthly_budget = f64::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn quality_out_of_range_rejected() {
        let mut settings = DocumenterSettings::default();
        settings.review.default_quality_score = 1.5;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn negative_price_rejected() {
        let mut settings = DocumenterSettings::default();
        let _ = settings.generation.pricing.insert("gpt-4".into(), -1.0);
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("gpt-4"));
    }

    #[test]
    fn empty_pool_rejected() {
        let mut settings = DocumenterSettings::default();
        settings.ledger.pool_size = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: DocumenterSettings =
            serde_json::from_str(r#"{"budget": {"monthly_budget": 10.0}}"#).unwrap();
        assert!((settings.budget.monthly_budget - 10.0).abs() < f64::EPSILON);
        assert_eq!(settings.ledger.pool_size, 8);
    }
}
