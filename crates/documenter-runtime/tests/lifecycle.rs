#![allow(unused_results, missing_docs)]
//! End-to-end document lifecycle against an in-memory ledger and a temp
//! docs directory.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use documenter_governor::{BudgetTier, month_key};
use documenter_learning::SuggestionKind;
use documenter_ledger::{ActivityStatus, DocumentStage, Ledger};
use documenter_review::StagingError;
use documenter_runtime::{
    Generation, GenerationError, GenerateRequest, Orchestrator, OrchestratorError, SubmitReview,
    TextGenerator,
};
use documenter_settings::DocumenterSettings;
use tempfile::TempDir;

const DRAFT: &str = "# Widget Technical Specification\n\nOverview of the widget.\nIt scales.";

struct FixedGenerator {
    provider: &'static str,
    model: &'static str,
    calls: AtomicUsize,
}

impl FixedGenerator {
    fn new(provider: &'static str, model: &'static str) -> Arc<Self> {
        Arc::new(Self {
            provider,
            model,
            calls: AtomicUsize::new(0),
        })
    }
}

impl TextGenerator for FixedGenerator {
    fn provider(&self) -> &str {
        self.provider
    }

    fn model(&self) -> &str {
        self.model
    }

    fn generate(&self, _prompt: &str) -> Result<Generation, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Generation {
            content: DRAFT.to_string(),
            tokens: 800,
        })
    }
}

struct FailingGenerator;

impl TextGenerator for FailingGenerator {
    fn provider(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        "gpt-3.5-turbo"
    }

    fn generate(&self, _prompt: &str) -> Result<Generation, GenerationError> {
        Err(GenerationError::Failed {
            message: "rate limited".into(),
        })
    }
}

struct Harness {
    dir: TempDir,
    ledger: Ledger,
    settings: DocumenterSettings,
}

impl Harness {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let mut settings = DocumenterSettings::default();
        settings.review.docs_dir = dir.path().join("docs");
        Self {
            dir,
            ledger: Ledger::in_memory().unwrap(),
            settings,
        }
    }

    fn orchestrator(&self, generator: Arc<dyn TextGenerator>) -> Orchestrator {
        Orchestrator::new(self.ledger.clone(), &self.settings, generator).unwrap()
    }

    fn inbox(&self, name: &str, content: &str) -> std::path::PathBuf {
        let inbox = self.dir.path().join("inbox");
        fs::create_dir_all(&inbox).unwrap();
        let path = inbox.join(name);
        fs::write(&path, content).unwrap();
        path
    }
}

fn request(stage_for_review: bool) -> GenerateRequest {
    GenerateRequest {
        doc_type: "technical_spec".into(),
        context: "Widget platform".into(),
        features: Some("- horizontal scaling".into()),
        source: "test".into(),
        stage_for_review,
    }
}

fn submission(path: &Path) -> SubmitReview {
    SubmitReview {
        path: path.to_path_buf(),
        document_id: None,
        reviewer: "Sam".into(),
        changes_summary: "added licensing terms".into(),
        review_time_seconds: None,
        quality_score: None,
        prepare_for_licensing: false,
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-12
}

#[test]
fn generate_review_and_license() {
    let h = Harness::new();
    let orch = h.orchestrator(FixedGenerator::new("openai", "gpt-3.5-turbo"));

    // Generate: 800 tokens at $0.002/1k.
    let outcome = orch.generate(&request(false)).unwrap();
    assert!(approx(outcome.cost, 0.0016));
    assert_eq!(outcome.tokens, 800);
    assert_eq!(outcome.provider, "openai");
    assert_eq!(outcome.budget.tier, BudgetTier::Ok);
    let doc_id = outcome.document_id.unwrap();
    let filename = outcome.filename.unwrap();
    assert!(filename.starts_with(&format!("technical_spec_{}_", outcome.activity_id)));

    let activity = h.ledger.get_activity(outcome.activity_id).unwrap();
    assert_eq!(activity.status, ActivityStatus::Generated);
    assert_eq!(activity.ai_tokens_used, 800);
    assert!(approx(activity.ai_cost, 0.0016));
    assert_eq!(orch.document_stage(doc_id).unwrap(), DocumentStage::Draft);

    // Stage for review.
    let review_copy = orch.stage_for_review(doc_id).unwrap();
    assert_eq!(review_copy, orch.areas().review_dir().join(&filename));
    assert!(review_copy.with_extension("json").exists());
    assert_eq!(orch.document_stage(doc_id).unwrap(), DocumentStage::PendingReview);
    let staged = fs::read_to_string(&review_copy).unwrap();
    assert!(staged.contains("# Cost: $0.001600"));
    assert!(staged.contains("# Model: gpt-3.5-turbo"));

    // Reviewer returns the copy under a prefixed name with one line added.
    let reviewed = format!("{staged}Licensing terms apply.\n");
    let submitted = h.inbox(&format!("reviewed_{filename}"), &reviewed);
    let result = orch.submit_review(&submission(&submitted)).unwrap();
    assert_eq!(result.document_id, doc_id);
    assert_eq!(result.patterns.len(), 1);
    assert!(submitted.exists());

    let doc = h.ledger.get_document(doc_id).unwrap();
    assert_eq!(doc.stage(), DocumentStage::Reviewed);
    assert_eq!(
        doc.final_content.as_deref(),
        Some(format!("{DRAFT}\nLicensing terms apply.").as_str())
    );
    assert_eq!(doc.review_time_seconds, Some(300));
    assert_eq!(doc.quality_score, Some(0.8));
    assert_eq!(
        doc.review_filepath,
        Some(result.approved_path.display().to_string())
    );

    let activity = h.ledger.get_activity(outcome.activity_id).unwrap();
    assert_eq!(activity.status, ActivityStatus::Completed);
    assert_eq!(activity.human_time_seconds, 300);

    // Licensing.
    let licensing = orch.prepare_for_licensing(doc_id).unwrap();
    assert_eq!(
        licensing.file_name().unwrap().to_str().unwrap(),
        format!("licensing_reviewed_{filename}")
    );
    assert_eq!(orch.document_stage(doc_id).unwrap(), DocumentStage::LicensingReady);
    let wrapped = fs::read_to_string(&licensing).unwrap();
    assert!(wrapped.starts_with("# SOFTWARE DOCUMENTATION FOR LICENSING\n"));
    assert!(!wrapped.contains("# REVIEWED DOCUMENT"));

    let (package, manifest) = orch.create_licensing_package("Widget", "1.0").unwrap();
    assert_eq!(manifest.total_documents, 1);
    assert!(package.join("manifest.json").exists());
}

#[test]
fn learned_addition_is_suggested_for_next_draft() {
    let h = Harness::new();
    let orch = h.orchestrator(FixedGenerator::new("openai", "gpt-3.5-turbo"));

    let first = orch.generate(&request(true)).unwrap();
    let copy = first.review_path.unwrap();
    let staged = fs::read_to_string(&copy).unwrap();
    fs::write(&copy, format!("{staged}Licensing terms apply.\n")).unwrap();
    orch.submit_review(&submission(&copy)).unwrap();

    let second = orch.generate(&request(false)).unwrap();
    assert_eq!(second.content, DRAFT);
    assert_eq!(second.suggestions.len(), 1);
    assert_eq!(second.suggestions[0].kind, SuggestionKind::SuggestInsertion);
    assert_eq!(second.suggestions[0].example, "Licensing terms apply.");
}

#[test]
fn generation_failure_records_simulated_cost_without_document() {
    let h = Harness::new();
    let orch = h.orchestrator(Arc::new(FailingGenerator));

    let outcome = orch.generate(&request(true)).unwrap();
    assert_eq!(outcome.document_id, None);
    assert_eq!(outcome.review_path, None);
    assert_eq!(outcome.provider, "simulated");
    assert_eq!(outcome.tokens, 800);
    assert!(approx(outcome.cost, 0.0016));
    assert!(!outcome.content.is_empty());

    let records = h.ledger.cost_records_for_activity(outcome.activity_id).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].model, "simulated");
    assert_eq!(
        h.ledger.get_activity(outcome.activity_id).unwrap().status,
        ActivityStatus::Generated
    );
    assert!(h.ledger.documents_in_stage(DocumentStage::Draft).unwrap().is_empty());
}

#[test]
fn critical_spend_routes_to_local_generator() {
    let mut h = Harness::new();
    h.settings.budget.monthly_budget = 0.001;
    let primary = FixedGenerator::new("openai", "gpt-3.5-turbo");
    let local = FixedGenerator::new("local", "llama");
    let orch = h
        .orchestrator(primary.clone())
        .with_local_generator(local.clone());

    let first = orch.generate(&request(false)).unwrap();
    assert_eq!(first.budget.tier, BudgetTier::Critical);
    assert!(first.budget.force_local);
    assert!(h.ledger.budget_state().unwrap().force_local);

    let second = orch.generate(&request(false)).unwrap();
    assert_eq!(second.provider, "local");
    assert_eq!(second.model, "llama");
    assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
    assert_eq!(local.calls.load(Ordering::SeqCst), 1);

    orch.governor().clear_force_local().unwrap();
    let third = orch.generate(&request(false)).unwrap();
    assert_eq!(third.provider, "openai");
}

#[test]
fn force_local_without_local_generator_uses_simulated_drafts() {
    let h = Harness::new();
    h.ledger.set_force_local(true).unwrap();
    let primary = FixedGenerator::new("openai", "gpt-3.5-turbo");
    let orch = h.orchestrator(primary.clone());

    let outcome = orch.generate(&request(false)).unwrap();
    assert_eq!(outcome.provider, "simulated");
    assert!(outcome.document_id.is_some());
    assert_eq!(primary.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn unmatched_submission_is_ambiguous_and_left_in_place() {
    let h = Harness::new();
    let orch = h.orchestrator(FixedGenerator::new("openai", "gpt-3.5-turbo"));
    orch.generate(&request(true)).unwrap();

    let stray = h.inbox("reviewed_unknown_doc.md", "Some text");
    let err = orch.submit_review(&submission(&stray)).unwrap_err();
    assert_matches!(
        err,
        OrchestratorError::AmbiguousMatch { ref submitted, ref tried } => {
            assert_eq!(submitted, "reviewed_unknown_doc.md");
            assert_eq!(tried.len(), 4);
        }
    );
    assert!(stray.exists());
}

#[test]
fn missing_submission_is_not_found() {
    let h = Harness::new();
    let orch = h.orchestrator(FixedGenerator::new("openai", "gpt-3.5-turbo"));
    let err = orch
        .submit_review(&submission(&h.dir.path().join("nope.md")))
        .unwrap_err();
    assert_matches!(err, OrchestratorError::NotFound { entity: "file", .. });
}

#[test]
fn out_of_order_transitions_are_rejected() {
    let h = Harness::new();
    let orch = h.orchestrator(FixedGenerator::new("openai", "gpt-3.5-turbo"));
    let doc_id = orch.generate(&request(false)).unwrap().document_id.unwrap();

    assert_matches!(
        orch.prepare_for_licensing(doc_id),
        Err(OrchestratorError::InvalidTransition {
            from: DocumentStage::Draft,
            to: DocumentStage::LicensingReady,
            ..
        })
    );

    let file = h.inbox("anything.md", "Reviewed text");
    let mut explicit = submission(&file);
    explicit.document_id = Some(doc_id);
    assert_matches!(
        orch.submit_review(&explicit),
        Err(OrchestratorError::InvalidTransition {
            from: DocumentStage::Draft,
            to: DocumentStage::Reviewed,
            ..
        })
    );

    orch.stage_for_review(doc_id).unwrap();
    assert_matches!(
        orch.stage_for_review(doc_id),
        Err(OrchestratorError::InvalidTransition {
            from: DocumentStage::PendingReview,
            ..
        })
    );
}

#[test]
fn out_of_range_quality_is_rejected() {
    let h = Harness::new();
    let orch = h.orchestrator(FixedGenerator::new("openai", "gpt-3.5-turbo"));
    let outcome = orch.generate(&request(true)).unwrap();

    let mut bad = submission(&outcome.review_path.unwrap());
    bad.quality_score = Some(1.5);
    assert_matches!(orch.submit_review(&bad), Err(OrchestratorError::InvalidInput(_)));
    assert_eq!(
        orch.document_stage(outcome.document_id.unwrap()).unwrap(),
        DocumentStage::PendingReview
    );
}

#[test]
fn submit_can_prepare_licensing_in_one_call() {
    let h = Harness::new();
    let orch = h.orchestrator(FixedGenerator::new("openai", "gpt-3.5-turbo"));
    let outcome = orch.generate(&request(true)).unwrap();

    let mut sub = submission(&outcome.review_path.unwrap());
    sub.prepare_for_licensing = true;
    sub.review_time_seconds = Some(120);
    let result = orch.submit_review(&sub).unwrap();

    assert!(result.licensing_path.unwrap().exists());
    let doc = h.ledger.get_document(result.document_id).unwrap();
    assert_eq!(doc.stage(), DocumentStage::LicensingReady);
    assert_eq!(doc.review_time_seconds, Some(120));
    assert!(result.patterns.is_empty());
}

#[test]
fn pending_documents_become_stuck_after_threshold() {
    let h = Harness::new();
    let orch = h.orchestrator(FixedGenerator::new("openai", "gpt-3.5-turbo"));
    let doc_id = orch.generate(&request(true)).unwrap().document_id.unwrap();

    assert!(orch.stuck_documents(Utc::now()).unwrap().is_empty());
    let later = orch.stuck_documents(Utc::now() + Duration::hours(49)).unwrap();
    assert_eq!(later.len(), 1);
    assert_eq!(later[0].id, doc_id);
    assert_eq!(orch.pending_reviews().unwrap().len(), 1);
}

#[test]
fn invalid_budget_is_config_error() {
    let mut h = Harness::new();
    h.settings.budget.monthly_budget = 0.0;
    let err = Orchestrator::new(
        h.ledger.clone(),
        &h.settings,
        FixedGenerator::new("openai", "gpt-3.5-turbo"),
    )
    .unwrap_err();
    assert_matches!(err, OrchestratorError::Config(_));
}

#[test]
fn path_like_doc_type_is_rejected_before_any_spend() {
    let mut h = Harness::new();
    h.settings.budget.monthly_budget = 0.001;
    let primary = FixedGenerator::new("openai", "gpt-3.5-turbo");
    let orch = h.orchestrator(primary.clone());

    let mut req = request(true);
    req.doc_type = "api/v2".into();
    let err = orch.generate(&req).unwrap_err();
    assert_matches!(
        err,
        OrchestratorError::Staging(StagingError::InvalidName { what: "document type", .. })
    );

    assert_eq!(primary.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.ledger.activity_stats().unwrap().total, 0);
    assert!(h.ledger.documents_in_stage(DocumentStage::Draft).unwrap().is_empty());
    assert!(approx(
        h.ledger.spend_since(Utc::now() - Duration::days(1)).unwrap(),
        0.0
    ));
}

#[test]
fn budget_is_checked_even_when_staging_fails() {
    let mut h = Harness::new();
    h.settings.budget.monthly_budget = 0.001;
    // A plain file where the docs directory should be makes staging fail.
    let blocked = h.dir.path().join("blocked");
    fs::write(&blocked, "not a directory").unwrap();
    h.settings.review.docs_dir = blocked;
    let orch = h.orchestrator(FixedGenerator::new("openai", "gpt-3.5-turbo"));

    let err = orch.generate(&request(true)).unwrap_err();
    assert_matches!(err, OrchestratorError::Staging(_));

    assert!(h.ledger.budget_state().unwrap().force_local);
    let alerts = h.ledger.alerts_for_month(&month_key(Utc::now())).unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].level, "CRITICAL");
}
