//! Insight repository. Insights are insert-only.

use rusqlite::{Connection, params};

use crate::errors::Result;
use crate::ids::InsightId;
use crate::sqlite::repositories::query_all;
use crate::sqlite::row_types::InsightRow;

/// Insight repository.
pub struct InsightRepo;

impl InsightRepo {
    /// Append an insight.
    pub fn insert(
        conn: &Connection,
        metric_name: &str,
        metric_value: f64,
        recommendation: &str,
        now: &str,
    ) -> Result<InsightId> {
        let _ = conn.execute(
            "INSERT INTO insights (generated_at, metric_name, metric_value, recommendation)
             VALUES (?1, ?2, ?3, ?4)",
            params![now, metric_name, metric_value, recommendation],
        )?;
        Ok(InsightId(conn.last_insert_rowid()))
    }

    /// Most recent insights, newest first.
    pub fn recent(conn: &Connection, limit: u32) -> Result<Vec<InsightRow>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM insights ORDER BY id DESC LIMIT ?1",
            InsightRow::COLUMNS
        ))?;
        query_all(&mut stmt, [limit], InsightRow::from_row)
    }
}
