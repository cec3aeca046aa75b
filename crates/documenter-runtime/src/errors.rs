//! Orchestrator error type.
//!
//! Component errors are folded into the four caller-facing kinds
//! (not found, ambiguous match, persistence, config) plus the lifecycle
//! and file-staging failures only the orchestrator can raise.

use documenter_governor::GovernorError;
use documenter_learning::LearningError;
use documenter_ledger::{DocumentId, DocumentStage, LedgerError};
use documenter_review::{MatchError, StagingError};

/// Errors returned by [`Orchestrator`](crate::Orchestrator) operations.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// A referenced record or file does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Record kind, or `file`.
        entity: &'static str,
        /// Identifier or path.
        id: String,
    },

    /// A submitted file could not be tied to any document.
    #[error("no document matches {submitted} (tried: {})", .tried.join(", "))]
    AmbiguousMatch {
        /// Basename of the submitted file.
        submitted: String,
        /// Candidate patterns, in the order tried.
        tried: Vec<String>,
    },

    /// The document is not in the stage the operation requires.
    #[error("document {document_id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Document id.
        document_id: DocumentId,
        /// Current stage.
        from: DocumentStage,
        /// Requested stage.
        to: DocumentStage,
    },

    /// Ledger storage failed.
    #[error("persistence error: {0}")]
    Persistence(LedgerError),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A caller-supplied value is out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Review-area file handling failed.
    #[error(transparent)]
    Staging(#[from] StagingError),

    /// A stored correction pattern could not be used.
    #[error(transparent)]
    Learning(LearningError),
}

impl OrchestratorError {
    /// Short category label for logs.
    pub fn category(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::AmbiguousMatch { .. } => "ambiguous_match",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Persistence(_) => "persistence",
            Self::Config(_) => "config",
            Self::InvalidInput(_) => "invalid_input",
            Self::Staging(_) => "staging",
            Self::Learning(_) => "learning",
        }
    }
}

impl From<LedgerError> for OrchestratorError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => Self::Persistence(other),
        }
    }
}

impl From<GovernorError> for OrchestratorError {
    fn from(err: GovernorError) -> Self {
        match err {
            GovernorError::Config(message) => Self::Config(message),
            GovernorError::Ledger(e) => e.into(),
        }
    }
}

impl From<LearningError> for OrchestratorError {
    fn from(err: LearningError) -> Self {
        match err {
            LearningError::Ledger(e) => e.into(),
            other => Self::Learning(other),
        }
    }
}

impl From<MatchError> for OrchestratorError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::NoMatch { submitted, tried } => Self::AmbiguousMatch { submitted, tried },
            MatchError::Ledger(e) => e.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, OrchestratorError>;
