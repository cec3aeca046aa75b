//! Budget state and alert repository. Written only by the cost governor.

use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::{LedgerError, Result};
use crate::ids::AlertId;
use crate::sqlite::repositories::query_all;
use crate::sqlite::row_types::{BudgetAlertRow, BudgetStateRow};

/// Fields of a new budget alert.
pub struct NewBudgetAlert<'a> {
    /// Budget month, `YYYY-MM`.
    pub month: &'a str,
    /// Tier name.
    pub level: &'a str,
    /// Percent of budget used.
    pub utilization: f64,
    /// Month-to-date spend.
    pub monthly_spent: f64,
    /// Budget in force.
    pub budget: f64,
    /// Alert message.
    pub message: &'a str,
    /// Recommended action.
    pub recommended_action: &'a str,
}

/// Budget repository.
pub struct BudgetRepo;

impl BudgetRepo {
    /// Read the singleton state row.
    pub fn state(conn: &Connection) -> Result<BudgetStateRow> {
        conn.query_row(
            "SELECT force_local, updated_at FROM budget_state WHERE id = 1",
            [],
            |row| {
                Ok(BudgetStateRow {
                    force_local: row.get(0)?,
                    updated_at: row.get(1)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| LedgerError::not_found("budget_state", 1))
    }

    /// Set the force-local flag.
    pub fn set_force_local(conn: &Connection, force_local: bool, now: &str) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO budget_state (id, force_local, updated_at) VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET force_local = excluded.force_local,
                                           updated_at = excluded.updated_at",
            params![force_local, now],
        )?;
        Ok(())
    }

    /// Whether an alert of `level` was already recorded for `month`.
    pub fn alert_exists(conn: &Connection, month: &str, level: &str) -> Result<bool> {
        let exists = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM budget_alerts WHERE month = ?1 AND level = ?2)",
            params![month, level],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Append an alert record.
    pub fn insert_alert(conn: &Connection, alert: &NewBudgetAlert<'_>, now: &str) -> Result<AlertId> {
        let _ = conn.execute(
            "INSERT INTO budget_alerts
               (created_at, month, level, utilization, monthly_spent, budget, message, recommended_action)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                now,
                alert.month,
                alert.level,
                alert.utilization,
                alert.monthly_spent,
                alert.budget,
                alert.message,
                alert.recommended_action
            ],
        )?;
        Ok(AlertId(conn.last_insert_rowid()))
    }

    /// Alerts recorded for `month`, oldest first.
    pub fn alerts_for_month(conn: &Connection, month: &str) -> Result<Vec<BudgetAlertRow>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM budget_alerts WHERE month = ?1 ORDER BY id ASC",
            BudgetAlertRow::COLUMNS
        ))?;
        query_all(&mut stmt, [month], BudgetAlertRow::from_row)
    }
}
