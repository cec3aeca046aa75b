//! Schema migration runner for the ledger database.
//!
//! Migrations are embedded with [`include_str!`] and applied in version
//! order, each inside its own transaction. Applied versions are recorded in
//! `schema_version`, so running the migrator twice is a no-op.

use rusqlite::{Connection, Transaction, TransactionBehavior, params};
use tracing::{debug, info};

use crate::errors::{LedgerError, Result};
use crate::sqlite::row_helpers::now_ts;

struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Base schema: activities, documents, cost records, learning",
        sql: include_str!("v001_schema.sql"),
    },
    Migration {
        version: 2,
        description: "Licensing columns, budget state and budget alerts",
        sql: include_str!("v002_licensing_budget.sql"),
    },
];

impl Migration {
    fn error(&self, step: &str, e: &rusqlite::Error) -> LedgerError {
        LedgerError::Migration {
            message: format!("v{:03} ({}) {step}: {e}", self.version, self.description),
        }
    }

    /// Run the script and record the version in one immediate transaction.
    fn apply(&self, conn: &Connection) -> Result<()> {
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
            .map_err(|e| self.error("begin", &e))?;
        tx.execute_batch(self.sql)
            .map_err(|e| self.error("script", &e))?;
        let _ = tx
            .execute(
                "INSERT INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
                params![self.version, now_ts(), self.description],
            )
            .map_err(|e| self.error("record", &e))?;
        tx.commit().map_err(|e| self.error("commit", &e))
    }
}

/// Bring the schema up to date. Returns how many migrations this call applied.
pub fn run_migrations(conn: &Connection) -> Result<u32> {
    conn.execute_batch(VERSION_TABLE)
        .map_err(|e| LedgerError::Migration {
            message: format!("schema_version table: {e}"),
        })?;
    let current = current_version(conn)?;

    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();
    if pending.is_empty() {
        debug!(version = current, "schema up to date");
        return Ok(0);
    }
    for migration in &pending {
        debug!(version = migration.version, description = migration.description, "applying migration");
        migration.apply(conn)?;
    }
    info!(from = current, to = latest_version(), "schema migrated");
    Ok(pending.len() as u32)
}

/// Highest applied migration version, or 0 on a fresh database.
pub fn current_version(conn: &Connection) -> Result<u32> {
    conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |row| {
        row.get(0)
    })
    .map_err(|e| LedgerError::Migration {
        message: format!("schema_version unreadable: {e}"),
    })
}

/// Latest migration version compiled into this build.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

const VERSION_TABLE: &str = "CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER PRIMARY KEY,
    applied_at  TEXT    NOT NULL,
    description TEXT
);";

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
