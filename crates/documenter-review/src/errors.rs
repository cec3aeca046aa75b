//! Review-side error types.

use std::path::PathBuf;

use documenter_ledger::LedgerError;
use thiserror::Error;

/// A submitted file could not be tied to a ledger document.
#[derive(Debug, Error)]
pub enum MatchError {
    /// No candidate pattern matched any document.
    #[error("no document matches {submitted} (tried: {})", .tried.join(", "))]
    NoMatch {
        /// Basename of the submitted file.
        submitted: String,
        /// Candidate patterns, in the order tried.
        tried: Vec<String>,
    },

    /// Ledger lookup failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// File-system failures in the staging areas.
#[derive(Debug, Error)]
pub enum StagingError {
    /// Reading or writing a file failed.
    #[error("io error at {}: {source}", .path.display())]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Sidecar or manifest JSON failed to encode or decode.
    #[error("json error at {}: {source}", .path.display())]
    Json {
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// The licensing glob could not be evaluated.
    #[error("glob error: {0}")]
    Glob(String),

    /// A name used as a path component is unusable.
    #[error("invalid {what}: {value:?}")]
    InvalidName {
        /// Which input.
        what: &'static str,
        /// Offending value.
        value: String,
    },
}

impl StagingError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
