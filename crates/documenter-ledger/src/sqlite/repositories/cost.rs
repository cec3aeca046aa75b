//! Cost record repository. Rows are append-only.

use rusqlite::{Connection, params};

use crate::errors::Result;
use crate::ids::{ActivityId, CostRecordId};
use crate::sqlite::repositories::query_all;
use crate::sqlite::row_types::{CostRecordRow, CostTotals, DailyCost};

/// Fields of a new cost record.
pub struct NewCostRecord<'a> {
    /// Activity the spend belongs to.
    pub activity_id: ActivityId,
    /// Provider name.
    pub provider: &'a str,
    /// Model name.
    pub model: &'a str,
    /// Tokens billed.
    pub tokens_used: i64,
    /// Cost in USD.
    pub cost: f64,
}

/// Cost record repository.
pub struct CostRepo;

impl CostRepo {
    /// Append a cost record stamped with `timestamp`.
    pub fn insert(
        conn: &Connection,
        new: &NewCostRecord<'_>,
        timestamp: &str,
    ) -> Result<CostRecordId> {
        let _ = conn.execute(
            "INSERT INTO ai_costs (timestamp, provider, model, tokens_used, cost, activity_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                timestamp,
                new.provider,
                new.model,
                new.tokens_used,
                new.cost,
                new.activity_id
            ],
        )?;
        Ok(CostRecordId(conn.last_insert_rowid()))
    }

    /// Cost records of one activity, oldest first.
    pub fn for_activity(conn: &Connection, id: ActivityId) -> Result<Vec<CostRecordRow>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM ai_costs WHERE activity_id = ?1 ORDER BY id ASC",
            CostRecordRow::COLUMNS
        ))?;
        query_all(&mut stmt, [id], CostRecordRow::from_row)
    }

    /// Totals over the cost records of one activity.
    pub fn totals_for_activity(conn: &Connection, id: ActivityId) -> Result<CostTotals> {
        let totals = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(tokens_used), 0), COALESCE(SUM(cost), 0.0)
             FROM ai_costs WHERE activity_id = ?1",
            [id],
            |row| {
                Ok(CostTotals {
                    records: row.get(0)?,
                    tokens: row.get(1)?,
                    cost: row.get(2)?,
                })
            },
        )?;
        Ok(totals)
    }

    /// Sum of costs recorded at or after `since`.
    pub fn spend_since(conn: &Connection, since: &str) -> Result<f64> {
        let spend = conn.query_row(
            "SELECT COALESCE(SUM(cost), 0.0) FROM ai_costs WHERE timestamp >= ?1",
            [since],
            |row| row.get(0),
        )?;
        Ok(spend)
    }

    /// Per-day totals for records at or after `since`, newest day first.
    pub fn daily(conn: &Connection, since: &str) -> Result<Vec<DailyCost>> {
        let mut stmt = conn.prepare(
            "SELECT substr(timestamp, 1, 10) AS day, SUM(tokens_used), SUM(cost)
             FROM ai_costs WHERE timestamp >= ?1
             GROUP BY day ORDER BY day DESC",
        )?;
        let rows = stmt
            .query_map([since], |row| {
                Ok(DailyCost {
                    date: row.get(0)?,
                    tokens: row.get(1)?,
                    cost: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}
