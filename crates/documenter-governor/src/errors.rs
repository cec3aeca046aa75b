//! Governor error type.

use documenter_ledger::LedgerError;
use thiserror::Error;

/// Errors from budget checks.
#[derive(Debug, Error)]
pub enum GovernorError {
    /// Budget configuration is unusable.
    #[error("config error: {0}")]
    Config(String),

    /// Ledger read or write failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Convenience type alias for governor results.
pub type Result<T> = std::result::Result<T, GovernorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_display() {
        let err = GovernorError::Config("monthly budget must be positive".into());
        assert_eq!(err.to_string(), "config error: monthly budget must be positive");
    }

    #[test]
    fn ledger_is_transparent() {
        let err = GovernorError::from(LedgerError::not_found("budget_state", 1));
        assert_eq!(err.to_string(), "budget_state not found: 1");
    }
}
