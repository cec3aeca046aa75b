//! The [`Ledger`] context object.
//!
//! Each operation checks out one pooled connection, runs its statements and
//! returns it. Writes commit immediately; multi-step operations such as
//! [`Ledger::complete_review`] are not wrapped in a transaction.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{debug, instrument};

use crate::errors::{LedgerError, Result};
use crate::ids::{ActivityId, AlertId, CostRecordId, DocumentId, InsightId, PatternId};
use crate::sqlite::connection::{self, ConnectionConfig, ConnectionPool};
use crate::sqlite::migrations;
use crate::sqlite::repositories::activity::{ActivityRepo, NewActivity};
use crate::sqlite::repositories::budget::{BudgetRepo, NewBudgetAlert};
use crate::sqlite::repositories::cost::{CostRepo, NewCostRecord};
use crate::sqlite::repositories::document::{CompletedReview, DocumentRepo, NewDocument};
use crate::sqlite::repositories::insight::InsightRepo;
use crate::sqlite::repositories::pattern::{NewPattern, PatternRepo};
use crate::sqlite::row_helpers::{format_ts, now_ts};
use crate::sqlite::row_types::{
    ActivityRow, ActivityStats, BudgetAlertRow, BudgetStateRow, CostRecordRow, CostTotals,
    DailyCost, DocumentRow, InsightRow, LearningPatternRow, PatternFrequency, ReviewSummary,
};
use crate::types::DocumentStage;

/// Pooled handle to the ledger database.
#[derive(Clone, Debug)]
pub struct Ledger {
    pool: ConnectionPool,
}

impl Ledger {
    /// Open (or create) a file-backed ledger and apply pending migrations.
    pub fn open(path: &Path, config: &ConnectionConfig) -> Result<Self> {
        Self::from_pool(connection::new_file(path, config)?)
    }

    /// Open a private in-memory ledger.
    pub fn in_memory() -> Result<Self> {
        Self::from_pool(connection::new_in_memory(&ConnectionConfig::default())?)
    }

    fn from_pool(pool: ConnectionPool) -> Result<Self> {
        let applied = {
            let conn = pool.get()?;
            migrations::run_migrations(&conn)?
        };
        debug!(applied, "ledger ready");
        Ok(Self { pool })
    }

    /// Run `f` with a pooled connection.
    ///
    /// `f` must not call back into the ledger: the in-memory pool has a
    /// single connection, so a nested checkout would wait on itself.
    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.pool.get()?;
        f(&conn)
    }

    /// Applied schema version.
    pub fn schema_version(&self) -> Result<u32> {
        self.with_conn(migrations::current_version)
    }

    // ── Core contract ───────────────────────────────────────────────────────

    /// Create a `pending` activity.
    #[instrument(skip(self, details))]
    pub fn create_activity(
        &self,
        activity_type: &str,
        source: &str,
        details: &serde_json::Value,
    ) -> Result<ActivityId> {
        self.with_conn(|conn| {
            ActivityRepo::create(
                conn,
                &NewActivity {
                    activity_type,
                    source,
                    details,
                },
                &now_ts(),
            )
        })
    }

    /// Append a cost record stamped now.
    pub fn record_cost(
        &self,
        activity_id: ActivityId,
        provider: &str,
        model: &str,
        tokens: i64,
        cost: f64,
    ) -> Result<CostRecordId> {
        self.record_cost_at(activity_id, provider, model, tokens, cost, Utc::now())
    }

    /// Append a cost record with an explicit timestamp, then recompute the
    /// activity's cached totals from its cost records and mark it `generated`.
    #[instrument(skip(self))]
    pub fn record_cost_at(
        &self,
        activity_id: ActivityId,
        provider: &str,
        model: &str,
        tokens: i64,
        cost: f64,
        at: DateTime<Utc>,
    ) -> Result<CostRecordId> {
        self.with_conn(|conn| {
            if ActivityRepo::get(conn, activity_id)?.is_none() {
                return Err(LedgerError::not_found("activity", activity_id));
            }
            let id = CostRepo::insert(
                conn,
                &NewCostRecord {
                    activity_id,
                    provider,
                    model,
                    tokens_used: tokens,
                    cost,
                },
                &format_ts(at),
            )?;
            let _ = ActivityRepo::refresh_cost_totals(conn, activity_id)?;
            Ok(id)
        })
    }

    /// Insert a Draft document for an existing activity.
    #[instrument(skip(self, content))]
    pub fn stage_document(
        &self,
        activity_id: ActivityId,
        doc_type: &str,
        content: &str,
        filename: &str,
    ) -> Result<DocumentId> {
        self.with_conn(|conn| {
            if ActivityRepo::get(conn, activity_id)?.is_none() {
                return Err(LedgerError::not_found("activity", activity_id));
            }
            DocumentRepo::insert(
                conn,
                &NewDocument {
                    activity_id,
                    doc_type,
                    draft_content: content,
                    filename,
                },
                &now_ts(),
            )
        })
    }

    /// Store reviewed content and metrics, then complete the owning activity.
    #[instrument(skip(self, final_content))]
    pub fn complete_review(
        &self,
        document_id: DocumentId,
        final_content: &str,
        review_time_seconds: i64,
        quality_score: f64,
    ) -> Result<()> {
        self.with_conn(|conn| {
            let doc = DocumentRepo::get(conn, document_id)?
                .ok_or_else(|| LedgerError::not_found("document", document_id))?;
            let _ = DocumentRepo::complete_review(
                conn,
                document_id,
                &CompletedReview {
                    final_content,
                    review_time_seconds,
                    quality_score,
                },
                &now_ts(),
            )?;
            let _ = ActivityRepo::complete(conn, doc.activity_id, review_time_seconds)?;
            Ok(())
        })
    }

    // ── Document progress ───────────────────────────────────────────────────

    /// Point a document at its review (or approved) file.
    #[instrument(skip(self))]
    pub fn set_review_filepath(&self, document_id: DocumentId, path: &str) -> Result<()> {
        self.with_conn(|conn| {
            match DocumentRepo::set_review_filepath(conn, document_id, path)? {
                0 => Err(LedgerError::not_found("document", document_id)),
                _ => Ok(()),
            }
        })
    }

    /// Record the licensing file and mark the document licensing-ready.
    #[instrument(skip(self))]
    pub fn mark_licensing_ready(&self, document_id: DocumentId, path: &str) -> Result<()> {
        self.with_conn(|conn| {
            match DocumentRepo::mark_licensing_ready(conn, document_id, path, &now_ts())? {
                0 => Err(LedgerError::not_found("document", document_id)),
                _ => Ok(()),
            }
        })
    }

    // ── Reads ───────────────────────────────────────────────────────────────

    /// Fetch an activity.
    pub fn get_activity(&self, id: ActivityId) -> Result<ActivityRow> {
        self.with_conn(|conn| {
            ActivityRepo::get(conn, id)?.ok_or_else(|| LedgerError::not_found("activity", id))
        })
    }

    /// Fetch a document.
    pub fn get_document(&self, id: DocumentId) -> Result<DocumentRow> {
        self.with_conn(|conn| {
            DocumentRepo::get(conn, id)?.ok_or_else(|| LedgerError::not_found("document", id))
        })
    }

    /// Documents whose filename or review path contains `needle`, highest id first.
    pub fn documents_matching(&self, needle: &str) -> Result<Vec<DocumentRow>> {
        self.with_conn(|conn| DocumentRepo::matching(conn, needle))
    }

    /// Documents currently in `stage`.
    pub fn documents_in_stage(&self, stage: DocumentStage) -> Result<Vec<DocumentRow>> {
        self.with_conn(|conn| DocumentRepo::in_stage(conn, stage))
    }

    /// Pending-review documents generated at or before `cutoff`.
    pub fn stuck_documents(&self, cutoff: DateTime<Utc>) -> Result<Vec<DocumentRow>> {
        self.with_conn(|conn| DocumentRepo::pending_since_before(conn, &format_ts(cutoff)))
    }

    /// Review count and mean review time since `since`.
    pub fn review_summary_since(&self, since: DateTime<Utc>) -> Result<ReviewSummary> {
        self.with_conn(|conn| DocumentRepo::review_summary(conn, &format_ts(since)))
    }

    /// Total spend recorded at or after `since`.
    pub fn spend_since(&self, since: DateTime<Utc>) -> Result<f64> {
        self.with_conn(|conn| CostRepo::spend_since(conn, &format_ts(since)))
    }

    /// Cost totals for one activity.
    pub fn cost_totals_for_activity(&self, id: ActivityId) -> Result<CostTotals> {
        self.with_conn(|conn| CostRepo::totals_for_activity(conn, id))
    }

    /// Cost records of one activity.
    pub fn cost_records_for_activity(&self, id: ActivityId) -> Result<Vec<CostRecordRow>> {
        self.with_conn(|conn| CostRepo::for_activity(conn, id))
    }

    /// Per-day spend since `since`, newest first.
    pub fn daily_costs(&self, since: DateTime<Utc>) -> Result<Vec<DailyCost>> {
        self.with_conn(|conn| CostRepo::daily(conn, &format_ts(since)))
    }

    /// Activity counts and totals.
    pub fn activity_stats(&self) -> Result<ActivityStats> {
        self.with_conn(ActivityRepo::stats)
    }

    /// Activities created since `since`, newest first.
    pub fn recent_activities(&self, since: DateTime<Utc>) -> Result<Vec<ActivityRow>> {
        self.with_conn(|conn| ActivityRepo::recent(conn, &format_ts(since)))
    }

    // ── Learning ────────────────────────────────────────────────────────────

    /// Store a learned pattern.
    pub fn insert_pattern(&self, pattern: &NewPattern<'_>) -> Result<PatternId> {
        self.with_conn(|conn| PatternRepo::insert(conn, pattern, &now_ts()))
    }

    /// Fetch a pattern.
    pub fn get_pattern(&self, id: PatternId) -> Result<LearningPatternRow> {
        self.with_conn(|conn| {
            PatternRepo::get(conn, id)?.ok_or_else(|| LedgerError::not_found("pattern", id))
        })
    }

    /// Most-applied patterns whose context contains `tag`.
    pub fn patterns_for_context(&self, tag: &str, limit: u32) -> Result<Vec<LearningPatternRow>> {
        self.with_conn(|conn| PatternRepo::top_for_context(conn, tag, limit))
    }

    /// Patterns learned from one document.
    pub fn patterns_for_document(&self, id: DocumentId) -> Result<Vec<LearningPatternRow>> {
        self.with_conn(|conn| PatternRepo::for_document(conn, id))
    }

    /// Bump a pattern's applied count.
    pub fn increment_pattern_applied(&self, id: PatternId) -> Result<()> {
        self.with_conn(|conn| match PatternRepo::increment_applied(conn, id)? {
            0 => Err(LedgerError::not_found("pattern", id)),
            _ => Ok(()),
        })
    }

    /// Patterns created since `since`, counted by type.
    pub fn pattern_frequency_since(&self, since: DateTime<Utc>) -> Result<Vec<PatternFrequency>> {
        self.with_conn(|conn| PatternRepo::frequency_since(conn, &format_ts(since)))
    }

    /// Append an insight.
    pub fn insert_insight(
        &self,
        metric_name: &str,
        metric_value: f64,
        recommendation: &str,
    ) -> Result<InsightId> {
        self.with_conn(|conn| {
            InsightRepo::insert(conn, metric_name, metric_value, recommendation, &now_ts())
        })
    }

    /// Newest insights.
    pub fn recent_insights(&self, limit: u32) -> Result<Vec<InsightRow>> {
        self.with_conn(|conn| InsightRepo::recent(conn, limit))
    }

    // ── Budget ──────────────────────────────────────────────────────────────

    /// Current budget state.
    pub fn budget_state(&self) -> Result<BudgetStateRow> {
        self.with_conn(BudgetRepo::state)
    }

    /// Set or clear the force-local flag.
    #[instrument(skip(self))]
    pub fn set_force_local(&self, force_local: bool) -> Result<()> {
        self.with_conn(|conn| BudgetRepo::set_force_local(conn, force_local, &now_ts()))
    }

    /// Whether an alert for `(month, level)` was already recorded.
    pub fn alert_exists(&self, month: &str, level: &str) -> Result<bool> {
        self.with_conn(|conn| BudgetRepo::alert_exists(conn, month, level))
    }

    /// Append a budget alert.
    pub fn insert_alert(&self, alert: &NewBudgetAlert<'_>) -> Result<AlertId> {
        self.with_conn(|conn| BudgetRepo::insert_alert(conn, alert, &now_ts()))
    }

    /// Alerts recorded for `month`.
    pub fn alerts_for_month(&self, month: &str) -> Result<Vec<BudgetAlertRow>> {
        self.with_conn(|conn| BudgetRepo::alerts_for_month(conn, month))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
