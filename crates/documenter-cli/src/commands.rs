//! Command handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use documenter_ledger::{ConnectionConfig, DocumentId, DocumentRow, DocumentStage, Ledger};
use documenter_runtime::{GenerateRequest, Orchestrator, SimulatedGenerator, SubmitReview};
use documenter_settings::DocumenterSettings;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::Command;

/// Listing row for `status`.
#[derive(Debug, Serialize)]
struct DocumentSummary<'a> {
    id: DocumentId,
    doc_type: &'a str,
    filename: &'a str,
    stage: DocumentStage,
    generated_at: &'a str,
    review_filepath: Option<&'a str>,
}

impl<'a> From<&'a DocumentRow> for DocumentSummary<'a> {
    fn from(doc: &'a DocumentRow) -> Self {
        Self {
            id: doc.id,
            doc_type: &doc.doc_type,
            filename: &doc.filename,
            stage: doc.stage(),
            generated_at: &doc.generated_at,
            review_filepath: doc.review_filepath.as_deref(),
        }
    }
}

/// Run one command. Returns the process exit code.
pub fn dispatch(command: Command, settings: &DocumenterSettings) -> Result<u8> {
    let ledger = open_ledger(settings)?;

    if matches!(command, Command::Migrate) {
        let version = ledger.schema_version().context("failed to read schema version")?;
        info!(version, "ledger migrated");
        print_json(&json!({
            "db_path": settings.ledger.db_path,
            "schema_version": version,
        }))?;
        return Ok(0);
    }

    let generator = Arc::new(SimulatedGenerator::new(settings.generation.simulated_tokens));
    let orch = Orchestrator::new(ledger.clone(), settings, generator)
        .context("failed to build orchestrator")?;

    match command {
        Command::Migrate => {}
        Command::Generate {
            doc_type,
            context,
            features,
            source,
            review,
        } => {
            let outcome = orch
                .generate(&GenerateRequest {
                    doc_type,
                    context,
                    features,
                    source,
                    stage_for_review: review,
                })
                .context("generation failed")?;
            print_json(&outcome)?;
        }
        Command::Stage { document_id } => {
            let path = orch
                .stage_for_review(DocumentId(document_id))
                .with_context(|| format!("failed to stage document {document_id}"))?;
            print_json(&json!({ "document_id": document_id, "review_path": path }))?;
        }
        Command::SubmitReview {
            path,
            document_id,
            reviewer,
            changes,
            review_seconds,
            quality,
            prepare_licensing,
        } => {
            let outcome = orch
                .submit_review(&SubmitReview {
                    path: path.clone(),
                    document_id: document_id.map(DocumentId),
                    reviewer,
                    changes_summary: changes,
                    review_time_seconds: review_seconds,
                    quality_score: quality,
                    prepare_for_licensing: prepare_licensing,
                })
                .with_context(|| format!("failed to submit review {}", path.display()))?;
            print_json(&outcome)?;
        }
        Command::PrepareLicensing { document_id } => {
            let path = orch
                .prepare_for_licensing(DocumentId(document_id))
                .with_context(|| format!("failed to prepare document {document_id} for licensing"))?;
            print_json(&json!({ "document_id": document_id, "licensing_path": path }))?;
        }
        Command::Package { product, version } => {
            let (dir, manifest) = orch
                .create_licensing_package(&product, &version)
                .context("failed to create licensing package")?;
            print_json(&json!({ "package_dir": dir, "manifest": manifest }))?;
        }
        Command::Budget { clear_force_local } => {
            let mut report = orch.check_budget().context("budget check failed")?;
            if clear_force_local {
                orch.governor()
                    .clear_force_local()
                    .context("failed to clear force-local")?;
                report.force_local = false;
            }
            print_json(&report)?;
            return Ok(u8::try_from(report.tier.exit_code()).unwrap_or(crate::EXIT_ERROR));
        }
        Command::Insights { days } => {
            let days = days.unwrap_or(settings.learning.insight_window_days);
            let insights = orch
                .generate_insights(days)
                .context("failed to generate insights")?;
            print_json(&json!({ "window_days": days, "insights": insights }))?;
        }
        Command::Costs { days } => {
            let stats = ledger.activity_stats().context("failed to read activity stats")?;
            let daily = ledger
                .daily_costs(Utc::now() - Duration::days(i64::from(days)))
                .context("failed to read daily costs")?;
            let avg_review_seconds = (stats.completed > 0)
                .then(|| stats.total_human_time_seconds as f64 / stats.completed as f64);
            print_json(&json!({
                "period_days": days,
                "total_activities": stats.total,
                "total_ai_cost": stats.total_cost,
                "total_tokens": stats.total_tokens,
                "total_human_time_seconds": stats.total_human_time_seconds,
                "avg_review_time_seconds": avg_review_seconds,
                "by_status": {
                    "pending": stats.pending,
                    "generated": stats.generated,
                    "completed": stats.completed,
                },
                "daily": daily,
            }))?;
        }
        Command::Status => {
            let pending = orch.pending_reviews().context("failed to list pending reviews")?;
            let stuck = orch
                .stuck_documents(Utc::now())
                .context("failed to list stuck documents")?;
            print_json(&json!({
                "pending_review": pending.iter().map(DocumentSummary::from).collect::<Vec<_>>(),
                "stuck_after_hours": settings.review.stuck_after_hours,
                "stuck": stuck.iter().map(DocumentSummary::from).collect::<Vec<_>>(),
            }))?;
        }
    }
    Ok(0)
}

fn open_ledger(settings: &DocumenterSettings) -> Result<Ledger> {
    let path = &settings.ledger.db_path;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create ledger directory {}", parent.display()))?;
    }
    let config = ConnectionConfig {
        pool_size: settings.ledger.pool_size,
        busy_timeout_ms: settings.ledger.busy_timeout_ms,
    };
    Ledger::open(path, &config)
        .with_context(|| format!("failed to open ledger {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
