//! The learning engine: feedback capture, pattern application, insights.

use chrono::{DateTime, Duration, Utc};
use documenter_ledger::{DocumentId, InsightId, Ledger, NewPattern, PatternId, PatternType};
use documenter_settings::LearningSettings;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::errors::{LearningError, Result};
use crate::patterns::{PatternRecord, context_tag, extract_patterns};

/// What a stored pattern suggests for a new draft.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    /// The draft contains text reviewers previously removed.
    SuggestRemoval,
    /// The draft lacks text reviewers previously added.
    SuggestInsertion,
}

/// One flag raised against a draft.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Pattern that fired.
    pub pattern_id: PatternId,
    /// Kind of suggestion.
    pub kind: SuggestionKind,
    /// The example text that matched (or is missing).
    pub example: String,
}

/// A draft plus the suggestions raised against it. `content` is never edited.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedPatterns {
    /// The draft, unchanged.
    pub content: String,
    /// Suggestions, in pattern priority order.
    pub suggestions: Vec<Suggestion>,
}

/// A stored insight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// Row id.
    pub id: InsightId,
    /// Metric key.
    pub metric_name: String,
    /// Metric value.
    pub metric_value: f64,
    /// Recommendation text.
    pub recommendation: String,
}

/// Pattern-learning engine bound to one ledger.
#[derive(Clone, Debug)]
pub struct LearningEngine {
    ledger: Ledger,
    settings: LearningSettings,
}

impl LearningEngine {
    /// Create an engine.
    pub fn new(ledger: Ledger, settings: LearningSettings) -> Self {
        Self { ledger, settings }
    }

    /// Learn from a reviewer's revision of `document_id`.
    ///
    /// Stores one pattern per non-empty change group and returns their ids.
    #[instrument(skip(self, original, revised))]
    pub fn save_feedback(
        &self,
        document_id: DocumentId,
        original: &str,
        revised: &str,
        doc_type: &str,
    ) -> Result<Vec<PatternId>> {
        let context = context_tag(doc_type);
        let mut ids = Vec::new();
        for record in extract_patterns(original, revised) {
            let correction = serde_json::to_string(&record)?;
            ids.push(self.ledger.insert_pattern(&NewPattern {
                pattern_type: record.pattern_type,
                context: &context,
                correction: &correction,
                learned_from_doc_id: Some(document_id),
            })?);
        }
        info!(patterns = ids.len(), "feedback saved");
        Ok(ids)
    }

    /// Check `content` against the most-applied patterns whose context
    /// contains `content_tag`. Each pattern that fires has its applied
    /// count bumped once.
    #[instrument(skip(self, content))]
    pub fn apply_learned_patterns(&self, content: &str, content_tag: &str) -> Result<AppliedPatterns> {
        let rows = self
            .ledger
            .patterns_for_context(content_tag, self.settings.max_applied_patterns)?;

        let mut suggestions = Vec::new();
        for row in rows {
            let record: PatternRecord = serde_json::from_str(&row.correction).map_err(|e| {
                LearningError::CorruptPattern {
                    id: row.id,
                    detail: e.to_string(),
                }
            })?;

            let hit = match row.pattern_type {
                PatternType::ContentRemoved => record
                    .examples
                    .iter()
                    .find(|ex| !ex.is_empty() && content.contains(ex.as_str()))
                    .map(|ex| (SuggestionKind::SuggestRemoval, ex.clone())),
                PatternType::ContentAdded => record
                    .examples
                    .first()
                    .filter(|ex| !ex.is_empty() && !content.contains(ex.as_str()))
                    .map(|ex| (SuggestionKind::SuggestInsertion, ex.clone())),
            };

            if let Some((kind, example)) = hit {
                self.ledger.increment_pattern_applied(row.id)?;
                debug!(pattern = %row.id, ?kind, "pattern applied");
                suggestions.push(Suggestion {
                    pattern_id: row.id,
                    kind,
                    example,
                });
            }
        }

        Ok(AppliedPatterns {
            content: content.to_string(),
            suggestions,
        })
    }

    /// Derive insights over the last `window_days` days and store them.
    #[instrument(skip(self))]
    pub fn generate_insights(&self, window_days: u32, now: DateTime<Utc>) -> Result<Vec<Insight>> {
        let since = now - Duration::days(i64::from(window_days));
        let mut drafts: Vec<(String, f64, String)> = Vec::new();

        let reviews = self.ledger.review_summary_since(since)?;
        if reviews.reviewed > 0 {
            let minutes = reviews.avg_review_seconds.unwrap_or(0.0) / 60.0;
            drafts.push((
                "avg_review_time_minutes".to_string(),
                minutes,
                format!(
                    "Average review time: {minutes:.1} minutes. Target: under {} minutes.",
                    self.settings.target_review_minutes
                ),
            ));
        }

        let mut frequencies = self.ledger.pattern_frequency_since(since)?;
        frequencies.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        for freq in frequencies.into_iter().filter(|f| f.frequency > 2) {
            let action = match freq.pattern_type {
                PatternType::ContentRemoved => "Reduce",
                PatternType::ContentAdded => "Include",
            };
            drafts.push((
                format!("pattern_{}", freq.pattern_type),
                freq.frequency as f64,
                format!(
                    "{action} content matching pattern: {} (occurred {} times)",
                    freq.pattern_type, freq.frequency
                ),
            ));
        }

        let mut insights = Vec::with_capacity(drafts.len());
        for (metric_name, metric_value, recommendation) in drafts {
            let id = self
                .ledger
                .insert_insight(&metric_name, metric_value, &recommendation)?;
            insights.push(Insight {
                id,
                metric_name,
                metric_value,
                recommendation,
            });
        }
        info!(count = insights.len(), window_days, "insights generated");
        Ok(insights)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
