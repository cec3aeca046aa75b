//! Error types for the ledger.
//!
//! [`LedgerError`] covers the three failure classes callers care about:
//! persistence failures (sqlite, pool, migration), missing records, and rows
//! whose stored values no longer decode.

use thiserror::Error;

/// Errors returned by ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// `SQLite` database error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// JSON serialization error for a JSON-typed column.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Schema migration failed.
    #[error("migration error: {message}")]
    Migration {
        /// Describes which migration failed and why.
        message: String,
    },

    /// Referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Record kind (`activity`, `document`, ...).
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// A stored value could not be decoded.
    #[error("corrupt row in {table}.{column}: {detail}")]
    CorruptRow {
        /// Table name.
        table: &'static str,
        /// Column name.
        column: &'static str,
        /// Decoder message.
        detail: String,
    },
}

impl LedgerError {
    /// Build a [`LedgerError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Whether this error is a storage failure rather than a missing record.
    pub fn is_persistence(&self) -> bool {
        !matches!(self, Self::NotFound { .. })
    }
}

/// Convenience type alias for ledger results.
pub type Result<T> = std::result::Result<T, LedgerError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
