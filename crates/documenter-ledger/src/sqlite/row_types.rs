//! Row structs for the ledger tables plus the aggregate read models built
//! from them.
//!
//! Each row type exposes a column list and a `from_row` decoder; decoding
//! failures surface as [`LedgerError::CorruptRow`].

use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;
use crate::ids::{ActivityId, AlertId, CostRecordId, DocumentId, InsightId, PatternId};
use crate::sqlite::row_helpers::{get, parse_enum, parse_json};
use crate::types::{ActivityStatus, DocumentStage, PatternType};

type RowResult<T> = Result<T, LedgerError>;

/// Row from `activities`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActivityRow {
    /// Activity id.
    pub id: ActivityId,
    /// Creation timestamp.
    pub timestamp: String,
    /// Kind of work (`documentation_generation`, ...).
    pub activity_type: String,
    /// Who or what requested the work.
    pub source: String,
    /// Free-form request details.
    pub details: serde_json::Value,
    /// Cached sum of `ai_costs.tokens_used`.
    pub ai_tokens_used: i64,
    /// Cached sum of `ai_costs.cost`.
    pub ai_cost: f64,
    /// Reviewer time attributed to this activity.
    pub human_time_seconds: i64,
    /// Lifecycle status.
    pub status: ActivityStatus,
}

impl ActivityRow {
    pub(crate) const COLUMNS: &'static str = "id, timestamp, activity_type, source, details, \
         ai_tokens_used, ai_cost, human_time_seconds, status";

    pub(crate) fn from_row(row: &Row<'_>) -> RowResult<Self> {
        const T: &str = "activities";
        let details: String = get(row, 4, T, "details")?;
        let status: String = get(row, 8, T, "status")?;
        Ok(Self {
            id: get(row, 0, T, "id")?,
            timestamp: get(row, 1, T, "timestamp")?,
            activity_type: get(row, 2, T, "activity_type")?,
            source: get(row, 3, T, "source")?,
            details: parse_json(&details, T, "details")?,
            ai_tokens_used: get(row, 5, T, "ai_tokens_used")?,
            ai_cost: get(row, 6, T, "ai_cost")?,
            human_time_seconds: get(row, 7, T, "human_time_seconds")?,
            status: parse_enum(&status, T, "status")?,
        })
    }
}

/// Row from `documents`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentRow {
    /// Document id.
    pub id: DocumentId,
    /// Owning activity.
    pub activity_id: ActivityId,
    /// Document type (`technical_spec`, `api_docs`, ...).
    pub doc_type: String,
    /// Generated text.
    pub draft_content: String,
    /// Reviewed text; set once on reconciliation.
    pub final_content: Option<String>,
    /// Generated filename.
    pub filename: String,
    /// Current review-area or approved-area path.
    pub review_filepath: Option<String>,
    /// Generation timestamp.
    pub generated_at: String,
    /// Review completion timestamp.
    pub reviewed_at: Option<String>,
    /// Time the reviewer spent.
    pub review_time_seconds: Option<i64>,
    /// Reviewer quality score in `[0, 1]`.
    pub quality_score: Option<f64>,
    /// Licensing-area path.
    pub licensing_filepath: Option<String>,
    /// Licensing preparation timestamp.
    pub licensed_at: Option<String>,
}

impl DocumentRow {
    pub(crate) const COLUMNS: &'static str = "id, activity_id, doc_type, draft_content, \
         final_content, filename, review_filepath, generated_at, reviewed_at, \
         review_time_seconds, quality_score, licensing_filepath, licensed_at";

    pub(crate) fn from_row(row: &Row<'_>) -> RowResult<Self> {
        const T: &str = "documents";
        Ok(Self {
            id: get(row, 0, T, "id")?,
            activity_id: get(row, 1, T, "activity_id")?,
            doc_type: get(row, 2, T, "doc_type")?,
            draft_content: get(row, 3, T, "draft_content")?,
            final_content: get(row, 4, T, "final_content")?,
            filename: get(row, 5, T, "filename")?,
            review_filepath: get(row, 6, T, "review_filepath")?,
            generated_at: get(row, 7, T, "generated_at")?,
            reviewed_at: get(row, 8, T, "reviewed_at")?,
            review_time_seconds: get(row, 9, T, "review_time_seconds")?,
            quality_score: get(row, 10, T, "quality_score")?,
            licensing_filepath: get(row, 11, T, "licensing_filepath")?,
            licensed_at: get(row, 12, T, "licensed_at")?,
        })
    }

    /// Current stage, derived from which fields are set.
    pub fn stage(&self) -> DocumentStage {
        if self.licensed_at.is_some() {
            DocumentStage::LicensingReady
        } else if self.final_content.is_some() {
            DocumentStage::Reviewed
        } else if self.review_filepath.is_some() {
            DocumentStage::PendingReview
        } else {
            DocumentStage::Draft
        }
    }
}

/// Row from `ai_costs`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CostRecordRow {
    /// Record id.
    pub id: CostRecordId,
    /// When the cost was incurred.
    pub timestamp: String,
    /// Provider name.
    pub provider: String,
    /// Model name.
    pub model: String,
    /// Tokens billed.
    pub tokens_used: i64,
    /// Cost in USD.
    pub cost: f64,
    /// Activity the spend belongs to.
    pub activity_id: ActivityId,
}

impl CostRecordRow {
    pub(crate) const COLUMNS: &'static str =
        "id, timestamp, provider, model, tokens_used, cost, activity_id";

    pub(crate) fn from_row(row: &Row<'_>) -> RowResult<Self> {
        const T: &str = "ai_costs";
        Ok(Self {
            id: get(row, 0, T, "id")?,
            timestamp: get(row, 1, T, "timestamp")?,
            provider: get(row, 2, T, "provider")?,
            model: get(row, 3, T, "model")?,
            tokens_used: get(row, 4, T, "tokens_used")?,
            cost: get(row, 5, T, "cost")?,
            activity_id: get(row, 6, T, "activity_id")?,
        })
    }
}

/// Row from `learning_patterns`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LearningPatternRow {
    /// Pattern id.
    pub id: PatternId,
    /// Removal or insertion.
    pub pattern_type: PatternType,
    /// Context tag, e.g. `Doc type: technical_spec`.
    pub context: String,
    /// JSON-serialised correction payload.
    pub correction: String,
    /// Document whose review produced this pattern.
    pub learned_from_doc_id: Option<DocumentId>,
    /// Creation timestamp.
    pub created_at: String,
    /// How many drafts this pattern has flagged.
    pub applied_count: i64,
}

impl LearningPatternRow {
    pub(crate) const COLUMNS: &'static str = "id, pattern_type, context, correction, \
         learned_from_doc_id, created_at, applied_count";

    pub(crate) fn from_row(row: &Row<'_>) -> RowResult<Self> {
        const T: &str = "learning_patterns";
        let pattern_type: String = get(row, 1, T, "pattern_type")?;
        Ok(Self {
            id: get(row, 0, T, "id")?,
            pattern_type: parse_enum(&pattern_type, T, "pattern_type")?,
            context: get(row, 2, T, "context")?,
            correction: get(row, 3, T, "correction")?,
            learned_from_doc_id: get(row, 4, T, "learned_from_doc_id")?,
            created_at: get(row, 5, T, "created_at")?,
            applied_count: get(row, 6, T, "applied_count")?,
        })
    }
}

/// Row from `insights`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InsightRow {
    /// Insight id.
    pub id: InsightId,
    /// Generation timestamp.
    pub generated_at: String,
    /// Metric key, e.g. `avg_review_time_minutes`.
    pub metric_name: String,
    /// Metric value.
    pub metric_value: f64,
    /// Human-readable recommendation.
    pub recommendation: String,
}

impl InsightRow {
    pub(crate) const COLUMNS: &'static str =
        "id, generated_at, metric_name, metric_value, recommendation";

    pub(crate) fn from_row(row: &Row<'_>) -> RowResult<Self> {
        const T: &str = "insights";
        Ok(Self {
            id: get(row, 0, T, "id")?,
            generated_at: get(row, 1, T, "generated_at")?,
            metric_name: get(row, 2, T, "metric_name")?,
            metric_value: get(row, 3, T, "metric_value")?,
            recommendation: get(row, 4, T, "recommendation")?,
        })
    }
}

/// The singleton `budget_state` row.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BudgetStateRow {
    /// Route new generations to the local generator.
    pub force_local: bool,
    /// Last write.
    pub updated_at: String,
}

/// Row from `budget_alerts`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BudgetAlertRow {
    /// Alert id.
    pub id: AlertId,
    /// When the alert was raised.
    pub created_at: String,
    /// Budget month, `YYYY-MM`.
    pub month: String,
    /// Tier name (`CRITICAL`, `WARNING`, `INFO`).
    pub level: String,
    /// Percent of budget used.
    pub utilization: f64,
    /// Spend at the time of the alert.
    pub monthly_spent: f64,
    /// Budget in force at the time of the alert.
    pub budget: f64,
    /// Alert message.
    pub message: String,
    /// Recommended operator action.
    pub recommended_action: String,
}

impl BudgetAlertRow {
    pub(crate) const COLUMNS: &'static str = "id, created_at, month, level, utilization, \
         monthly_spent, budget, message, recommended_action";

    pub(crate) fn from_row(row: &Row<'_>) -> RowResult<Self> {
        const T: &str = "budget_alerts";
        Ok(Self {
            id: get(row, 0, T, "id")?,
            created_at: get(row, 1, T, "created_at")?,
            month: get(row, 2, T, "month")?,
            level: get(row, 3, T, "level")?,
            utilization: get(row, 4, T, "utilization")?,
            monthly_spent: get(row, 5, T, "monthly_spent")?,
            budget: get(row, 6, T, "budget")?,
            message: get(row, 7, T, "message")?,
            recommended_action: get(row, 8, T, "recommended_action")?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregates
// ─────────────────────────────────────────────────────────────────────────────

/// Sum of the cost records of one activity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CostTotals {
    /// Number of cost records.
    pub records: i64,
    /// Total tokens.
    pub tokens: i64,
    /// Total cost in USD.
    pub cost: f64,
}

/// Spend for one UTC calendar day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyCost {
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Tokens billed that day.
    pub tokens: i64,
    /// Cost that day.
    pub cost: f64,
}

/// Activity counts by status plus overall totals.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityStats {
    /// All activities.
    pub total: i64,
    /// Activities still `pending`.
    pub pending: i64,
    /// Activities in `generated`.
    pub generated: i64,
    /// Activities in `completed`.
    pub completed: i64,
    /// Cached token total across activities.
    pub total_tokens: i64,
    /// Cached cost total across activities.
    pub total_cost: f64,
    /// Reviewer seconds across activities.
    pub total_human_time_seconds: i64,
}

/// Reviews completed within a window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    /// Documents reviewed in the window.
    pub reviewed: i64,
    /// Mean review time, when any review recorded one.
    pub avg_review_seconds: Option<f64>,
}

/// How many patterns of one type were learned within a window.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatternFrequency {
    /// Pattern type.
    pub pattern_type: PatternType,
    /// Number of patterns created.
    pub frequency: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> DocumentRow {
        DocumentRow {
            id: DocumentId(1),
            activity_id: ActivityId(1),
            doc_type: "technical_spec".into(),
            draft_content: "draft".into(),
            final_content: None,
            filename: "technical_spec_1_20240101_120000.md".into(),
            review_filepath: None,
            generated_at: "2024-01-01T12:00:00Z".into(),
            reviewed_at: None,
            review_time_seconds: None,
            quality_score: None,
            licensing_filepath: None,
            licensed_at: None,
        }
    }

    #[test]
    fn stage_draft_when_nothing_set() {
        assert_eq!(document().stage(), DocumentStage::Draft);
    }

    #[test]
    fn stage_pending_review_when_review_path_set() {
        let mut doc = document();
        doc.review_filepath = Some("docs/review/x.md".into());
        assert_eq!(doc.stage(), DocumentStage::PendingReview);
    }

    #[test]
    fn stage_reviewed_when_final_content_set() {
        let mut doc = document();
        doc.review_filepath = Some("docs/approved/reviewed_x.md".into());
        doc.final_content = Some("final".into());
        assert_eq!(doc.stage(), DocumentStage::Reviewed);
    }

    #[test]
    fn stage_licensing_ready_wins() {
        let mut doc = document();
        doc.final_content = Some("final".into());
        doc.licensed_at = Some("2024-01-02T00:00:00Z".into());
        assert_eq!(doc.stage(), DocumentStage::LicensingReady);
    }
}
