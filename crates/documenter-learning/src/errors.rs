//! Learning engine errors.

use documenter_ledger::{LedgerError, PatternId};
use thiserror::Error;

/// Errors from the learning engine.
#[derive(Debug, Error)]
pub enum LearningError {
    /// Ledger read or write failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A pattern could not be serialised for storage.
    #[error("pattern encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// A stored correction payload no longer decodes.
    #[error("corrupt correction payload on pattern {id}: {detail}")]
    CorruptPattern {
        /// Offending pattern.
        id: PatternId,
        /// Decoder message.
        detail: String,
    },
}

/// Convenience type alias for learning results.
pub type Result<T> = std::result::Result<T, LearningError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_pattern_display() {
        let err = LearningError::CorruptPattern {
            id: PatternId(4),
            detail: "expected value".into(),
        };
        assert_eq!(
            err.to_string(),
            "corrupt correction payload on pattern 4: expected value"
        );
    }

    #[test]
    fn ledger_error_passes_through() {
        let err = LearningError::from(LedgerError::not_found("document", 2));
        assert_eq!(err.to_string(), "document not found: 2");
    }
}
