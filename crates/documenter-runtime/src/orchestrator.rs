//! Orchestrator: per-document lifecycle coordinator.
//!
//! ```text
//! Draft --stage_for_review--> PendingReview --submit_review--> Reviewed
//!       --prepare_for_licensing--> LicensingReady
//! ```
//!
//! Every transition is written through the ledger. Stage checks read the
//! current row and then write; nothing isolates the two, so concurrent
//! submissions for one document are last-write-wins.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use documenter_governor::{BudgetReport, CostGovernor, calculate_cost};
use documenter_learning::{Insight, LearningEngine, Suggestion, context_tag};
use documenter_ledger::{
    ActivityId, DocumentId, DocumentRow, DocumentStage, Ledger, PatternId, format_ts,
};
use documenter_review::{
    PackageManifest, Provenance, ReviewAreas, ReviewHeader, StagingError, resolve_document,
    strip_metadata_header, validate_component,
};
use documenter_settings::{DocumenterSettings, GenerationSettings, ReviewSettings};
use serde::Serialize;
use serde_json::json;
use tracing::{field, info, instrument, warn};

use crate::errors::{OrchestratorError, Result};
use crate::generator::{SimulatedGenerator, TextGenerator, build_prompt};

/// Activity type recorded for generation requests.
const GENERATION_ACTIVITY: &str = "documentation_generation";

/// Input to [`Orchestrator::generate`].
#[derive(Clone, Debug)]
pub struct GenerateRequest {
    /// Document type (`technical_spec`, `api_docs`, ...).
    pub doc_type: String,
    /// Product context for the prompt.
    pub context: String,
    /// Optional feature list for the prompt.
    pub features: Option<String>,
    /// Requester label stored on the activity.
    pub source: String,
    /// Write a review copy right after generation.
    pub stage_for_review: bool,
}

/// Result of [`Orchestrator::generate`].
#[derive(Clone, Debug, Serialize)]
pub struct GenerateOutcome {
    /// Activity created for the request.
    pub activity_id: ActivityId,
    /// Draft document; `None` when generation failed.
    pub document_id: Option<DocumentId>,
    /// Draft filename; `None` when generation failed.
    pub filename: Option<String>,
    /// Generated text, or placeholder text after a failure.
    pub content: String,
    /// Provider label recorded on the cost record.
    pub provider: String,
    /// Model recorded on the cost record.
    pub model: String,
    /// Tokens billed.
    pub tokens: i64,
    /// Cost in USD.
    pub cost: f64,
    /// Review copy path, when staged.
    pub review_path: Option<PathBuf>,
    /// Learned-pattern flags for the draft.
    pub suggestions: Vec<Suggestion>,
    /// Budget check run after the cost was recorded.
    pub budget: BudgetReport,
}

/// Input to [`Orchestrator::submit_review`].
#[derive(Clone, Debug)]
pub struct SubmitReview {
    /// The reviewed file.
    pub path: PathBuf,
    /// Skip filename matching and use this document.
    pub document_id: Option<DocumentId>,
    /// Reviewer name.
    pub reviewer: String,
    /// Reviewer's summary of changes.
    pub changes_summary: String,
    /// Review duration; defaults to `review.default_review_seconds`.
    pub review_time_seconds: Option<i64>,
    /// Quality score in `[0, 1]`; defaults to `review.default_quality_score`.
    pub quality_score: Option<f64>,
    /// Continue straight to licensing preparation.
    pub prepare_for_licensing: bool,
}

/// Result of [`Orchestrator::submit_review`].
#[derive(Clone, Debug, Serialize)]
pub struct ReviewOutcome {
    /// Reviewed document.
    pub document_id: DocumentId,
    /// Approved file written.
    pub approved_path: PathBuf,
    /// Patterns learned from the edit.
    pub patterns: Vec<PatternId>,
    /// Licensing file, when prepared in the same call.
    pub licensing_path: Option<PathBuf>,
}

/// `{doc_type}_{activity_id}_{YYYYmmdd_HHMMSS}.md`.
pub fn draft_filename(doc_type: &str, activity_id: ActivityId, at: DateTime<Utc>) -> String {
    format!("{doc_type}_{activity_id}_{}.md", at.format("%Y%m%d_%H%M%S"))
}

/// Lifecycle coordinator. Owns handles to every component; nothing global.
pub struct Orchestrator {
    ledger: Ledger,
    governor: CostGovernor,
    learning: LearningEngine,
    areas: ReviewAreas,
    generation: GenerationSettings,
    review: ReviewSettings,
    generator: Arc<dyn TextGenerator>,
    local_generator: Option<Arc<dyn TextGenerator>>,
    simulated: SimulatedGenerator,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("generator", &self.generator.model())
            .field(
                "local_generator",
                &self.local_generator.as_ref().map(|g| g.model().to_string()),
            )
            .field("docs_dir", &self.areas.root())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Build an orchestrator over an opened ledger.
    pub fn new(
        ledger: Ledger,
        settings: &DocumenterSettings,
        generator: Arc<dyn TextGenerator>,
    ) -> Result<Self> {
        let governor = CostGovernor::from_settings(ledger.clone(), &settings.budget)?;
        let learning = LearningEngine::new(ledger.clone(), settings.learning.clone());
        Ok(Self {
            governor,
            learning,
            areas: ReviewAreas::new(settings.review.docs_dir.clone()),
            generation: settings.generation.clone(),
            review: settings.review.clone(),
            generator,
            local_generator: None,
            simulated: SimulatedGenerator::new(settings.generation.simulated_tokens),
            ledger,
        })
    }

    /// Generator used while the force-local switch is on.
    #[must_use]
    pub fn with_local_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.local_generator = Some(generator);
        self
    }

    /// Ledger handle.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Cost governor.
    pub fn governor(&self) -> &CostGovernor {
        &self.governor
    }

    /// Learning engine.
    pub fn learning(&self) -> &LearningEngine {
        &self.learning
    }

    /// Staging areas.
    pub fn areas(&self) -> &ReviewAreas {
        &self.areas
    }

    // ── Generation ──────────────────────────────────────────────────────────

    /// Generate a draft, record its cost and run the budget check.
    ///
    /// The budget check runs as soon as the cost is recorded, before the
    /// draft is stored or staged.
    ///
    /// A generator failure is not an error: the simulated cost is recorded,
    /// no document is created and the outcome carries placeholder text.
    #[instrument(skip(self, request), fields(doc_type = %request.doc_type, activity_id = field::Empty))]
    pub fn generate(&self, request: &GenerateRequest) -> Result<GenerateOutcome> {
        validate_component("document type", &request.doc_type)?;
        let activity_id = self.ledger.create_activity(
            GENERATION_ACTIVITY,
            &request.source,
            &json!({
                "doc_type": request.doc_type,
                "context_length": request.context.chars().count(),
                "licensing_focus": request.stage_for_review,
            }),
        )?;
        let _ = tracing::Span::current().record("activity_id", activity_id.get());

        let generator = self.select_generator()?;
        let prompt = build_prompt(
            &request.doc_type,
            &request.context,
            request.features.as_deref(),
        );

        let generation = match generator.generate(&prompt) {
            Ok(generation) => generation,
            Err(e) => {
                warn!(error = %e, provider = generator.provider(), "generation failed, recording simulated cost");
                return self.record_failed_generation(activity_id, &prompt);
            }
        };

        let cost = calculate_cost(generator.model(), generation.tokens, &self.generation);
        let _ = self.ledger.record_cost(
            activity_id,
            generator.provider(),
            generator.model(),
            generation.tokens,
            cost,
        )?;
        // Checked before the draft is stored; later failures must not skip it.
        let budget = self.governor.check(Utc::now())?;

        let filename = draft_filename(&request.doc_type, activity_id, Utc::now());
        let document_id = self.ledger.stage_document(
            activity_id,
            &request.doc_type,
            &generation.content,
            &filename,
        )?;
        info!(document_id = %document_id, %filename, tokens = generation.tokens, cost, "draft stored");

        let applied = self
            .learning
            .apply_learned_patterns(&generation.content, &context_tag(&request.doc_type))?;

        let review_path = if request.stage_for_review {
            Some(self.stage_for_review(document_id)?)
        } else {
            None
        };

        Ok(GenerateOutcome {
            activity_id,
            document_id: Some(document_id),
            filename: Some(filename),
            content: applied.content,
            provider: generator.provider().to_string(),
            model: generator.model().to_string(),
            tokens: generation.tokens,
            cost,
            review_path,
            suggestions: applied.suggestions,
            budget,
        })
    }

    fn select_generator(&self) -> Result<&dyn TextGenerator> {
        if !self.ledger.budget_state()?.force_local {
            return Ok(self.generator.as_ref());
        }
        match &self.local_generator {
            Some(local) => Ok(local.as_ref()),
            None => {
                warn!("force-local is on but no local generator is configured, using simulated drafts");
                Ok(&self.simulated)
            }
        }
    }

    fn record_failed_generation(&self, activity_id: ActivityId, prompt: &str) -> Result<GenerateOutcome> {
        let tokens = self.simulated.tokens();
        let cost = calculate_cost(&self.generation.model, tokens, &self.generation);
        let label = SimulatedGenerator::LABEL;
        let _ = self
            .ledger
            .record_cost(activity_id, label, label, tokens, cost)?;
        let budget = self.governor.check(Utc::now())?;
        Ok(GenerateOutcome {
            activity_id,
            document_id: None,
            filename: None,
            content: self.simulated.placeholder(prompt),
            provider: label.to_string(),
            model: label.to_string(),
            tokens,
            cost,
            review_path: None,
            suggestions: Vec::new(),
            budget,
        })
    }

    // ── Review ──────────────────────────────────────────────────────────────

    /// Write the review copy of a draft and move it to `PendingReview`.
    #[instrument(skip(self), fields(document_id = %document_id))]
    pub fn stage_for_review(&self, document_id: DocumentId) -> Result<PathBuf> {
        let doc = self.ledger.get_document(document_id)?;
        require_stage(&doc, DocumentStage::Draft, DocumentStage::PendingReview)?;

        let totals = self.ledger.cost_totals_for_activity(doc.activity_id)?;
        let model = self
            .ledger
            .cost_records_for_activity(doc.activity_id)?
            .pop()
            .map_or_else(|| "unknown".to_string(), |r| r.model);

        let header = ReviewHeader {
            doc_id: doc.id.get(),
            doc_type: doc.doc_type.clone(),
            generated_at: doc.generated_at.clone(),
            cost: totals.cost,
            tokens: totals.tokens,
            model,
        };
        let path = self.areas.write_review_copy(
            &header,
            Some(doc.activity_id.get()),
            &doc.filename,
            &doc.draft_content,
            &format_ts(Utc::now()),
        )?;
        self.ledger
            .set_review_filepath(document_id, &path.display().to_string())?;
        info!(path = %path.display(), "document staged for review");
        Ok(path)
    }

    /// Reconcile a reviewed file with its document.
    ///
    /// The submitted file is read but never moved or deleted.
    #[instrument(skip(self, submission), fields(path = %submission.path.display(), document_id = field::Empty))]
    pub fn submit_review(&self, submission: &SubmitReview) -> Result<ReviewOutcome> {
        let content = read_submitted(&submission.path)?;
        let doc = match submission.document_id {
            Some(id) => self.ledger.get_document(id)?,
            None => resolve_document(&self.ledger, &submission.path)?,
        };
        let _ = tracing::Span::current().record("document_id", doc.id.get());
        require_stage(&doc, DocumentStage::PendingReview, DocumentStage::Reviewed)?;

        let review_seconds = submission
            .review_time_seconds
            .unwrap_or(self.review.default_review_seconds);
        if review_seconds < 0 {
            return Err(OrchestratorError::InvalidInput(format!(
                "review time must not be negative, got {review_seconds}"
            )));
        }
        let quality = submission
            .quality_score
            .unwrap_or(self.review.default_quality_score);
        if !(0.0..=1.0).contains(&quality) {
            return Err(OrchestratorError::InvalidInput(format!(
                "quality score must be within [0, 1], got {quality}"
            )));
        }

        let body = strip_metadata_header(&content);
        let provenance = Provenance {
            doc_id: doc.id.get(),
            doc_type: doc.doc_type.clone(),
            generated_at: doc.generated_at.clone(),
            reviewed_at: format_ts(Utc::now()),
            reviewer: submission.reviewer.clone(),
            changes_summary: submission.changes_summary.clone(),
        };
        let approved_path = self.areas.write_approved(&doc.filename, &provenance, &body)?;

        self.ledger
            .complete_review(doc.id, &body, review_seconds, quality)?;
        self.ledger
            .set_review_filepath(doc.id, &approved_path.display().to_string())?;
        if let Some(review_copy) = &doc.review_filepath {
            let _ = self
                .areas
                .record_review(Path::new(review_copy), &provenance, &approved_path)?;
        }

        let patterns =
            self.learning
                .save_feedback(doc.id, &doc.draft_content, &body, &doc.doc_type)?;
        info!(
            approved = %approved_path.display(),
            patterns = patterns.len(),
            "review reconciled"
        );

        let licensing_path = if submission.prepare_for_licensing {
            Some(self.prepare_for_licensing(doc.id)?)
        } else {
            None
        };

        Ok(ReviewOutcome {
            document_id: doc.id,
            approved_path,
            patterns,
            licensing_path,
        })
    }

    // ── Licensing ───────────────────────────────────────────────────────────

    /// Wrap a reviewed document for licensing and mark it `LicensingReady`.
    #[instrument(skip(self), fields(document_id = %document_id))]
    pub fn prepare_for_licensing(&self, document_id: DocumentId) -> Result<PathBuf> {
        let doc = self.ledger.get_document(document_id)?;
        require_stage(&doc, DocumentStage::Reviewed, DocumentStage::LicensingReady)?;
        let final_content = doc.final_content.as_deref().unwrap_or_default();

        let body = strip_metadata_header(final_content);
        let approved_name = format!("reviewed_{}", doc.filename);
        let path = self
            .areas
            .write_licensing(&approved_name, &body, Utc::now().date_naive())?;
        self.ledger
            .mark_licensing_ready(document_id, &path.display().to_string())?;
        info!(path = %path.display(), "document prepared for licensing");
        Ok(path)
    }

    /// Bundle every licensing-ready file into a versioned package.
    #[instrument(skip(self))]
    pub fn create_licensing_package(
        &self,
        product_name: &str,
        version: &str,
    ) -> Result<(PathBuf, PackageManifest)> {
        Ok(self.areas.create_package(product_name, version, Utc::now())?)
    }

    // ── Reporting ───────────────────────────────────────────────────────────

    /// Current stage of a document.
    pub fn document_stage(&self, document_id: DocumentId) -> Result<DocumentStage> {
        Ok(self.ledger.get_document(document_id)?.stage())
    }

    /// Documents waiting for review.
    pub fn pending_reviews(&self) -> Result<Vec<DocumentRow>> {
        Ok(self
            .ledger
            .documents_in_stage(DocumentStage::PendingReview)?)
    }

    /// Documents pending review for longer than `review.stuck_after_hours`.
    pub fn stuck_documents(&self, now: DateTime<Utc>) -> Result<Vec<DocumentRow>> {
        let cutoff = now - Duration::hours(self.review.stuck_after_hours);
        Ok(self.ledger.stuck_documents(cutoff)?)
    }

    /// Run the budget check now.
    pub fn check_budget(&self) -> Result<BudgetReport> {
        Ok(self.governor.check(Utc::now())?)
    }

    /// Derive and store insights over the last `window_days` days.
    pub fn generate_insights(&self, window_days: u32) -> Result<Vec<Insight>> {
        Ok(self.learning.generate_insights(window_days, Utc::now())?)
    }
}

fn require_stage(doc: &DocumentRow, expected: DocumentStage, to: DocumentStage) -> Result<()> {
    let from = doc.stage();
    if from == expected {
        Ok(())
    } else {
        Err(OrchestratorError::InvalidTransition {
            document_id: doc.id,
            from,
            to,
        })
    }
}

fn read_submitted(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => OrchestratorError::NotFound {
            entity: "file",
            id: path.display().to_string(),
        },
        _ => StagingError::Io {
            path: path.to_path_buf(),
            source: e,
        }
        .into(),
    })
}
