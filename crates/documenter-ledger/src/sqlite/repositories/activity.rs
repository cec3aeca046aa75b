//! Activity repository.
//!
//! Cost columns on `activities` are a cache: they are only ever written by
//! [`ActivityRepo::refresh_cost_totals`], which recomputes them from
//! `ai_costs`.

use rusqlite::{Connection, params};

use crate::errors::Result;
use crate::ids::ActivityId;
use crate::sqlite::repositories::{query_all, query_first};
use crate::sqlite::row_types::{ActivityRow, ActivityStats};

/// Fields of a new activity.
pub struct NewActivity<'a> {
    /// Kind of work.
    pub activity_type: &'a str,
    /// Requesting source.
    pub source: &'a str,
    /// Request details.
    pub details: &'a serde_json::Value,
}

/// Activity repository.
pub struct ActivityRepo;

impl ActivityRepo {
    /// Insert a `pending` activity.
    pub fn create(conn: &Connection, new: &NewActivity<'_>, now: &str) -> Result<ActivityId> {
        let details = serde_json::to_string(new.details)?;
        let _ = conn.execute(
            "INSERT INTO activities (timestamp, activity_type, source, details, status)
             VALUES (?1, ?2, ?3, ?4, 'pending')",
            params![now, new.activity_type, new.source, details],
        )?;
        Ok(ActivityId(conn.last_insert_rowid()))
    }

    /// Fetch one activity.
    pub fn get(conn: &Connection, id: ActivityId) -> Result<Option<ActivityRow>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM activities WHERE id = ?1",
            ActivityRow::COLUMNS
        ))?;
        query_first(&mut stmt, [id], ActivityRow::from_row)
    }

    /// Recompute cached token/cost totals from `ai_costs` and mark the
    /// activity `generated`. Returns rows changed (0 if the id is unknown).
    pub fn refresh_cost_totals(conn: &Connection, id: ActivityId) -> Result<usize> {
        let changed = conn.execute(
            "UPDATE activities SET
               ai_tokens_used = (SELECT COALESCE(SUM(tokens_used), 0) FROM ai_costs WHERE activity_id = ?1),
               ai_cost        = (SELECT COALESCE(SUM(cost), 0.0) FROM ai_costs WHERE activity_id = ?1),
               status         = 'generated'
             WHERE id = ?1",
            [id],
        )?;
        Ok(changed)
    }

    /// Record reviewer time and mark the activity `completed`.
    pub fn complete(conn: &Connection, id: ActivityId, human_time_seconds: i64) -> Result<usize> {
        let changed = conn.execute(
            "UPDATE activities SET human_time_seconds = ?2, status = 'completed' WHERE id = ?1",
            params![id, human_time_seconds],
        )?;
        Ok(changed)
    }

    /// Activities created at or after `since`, newest first.
    pub fn recent(conn: &Connection, since: &str) -> Result<Vec<ActivityRow>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM activities WHERE timestamp >= ?1 ORDER BY id DESC",
            ActivityRow::COLUMNS
        ))?;
        query_all(&mut stmt, [since], ActivityRow::from_row)
    }

    /// Counts by status plus cached totals.
    pub fn stats(conn: &Connection) -> Result<ActivityStats> {
        let stats = conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(status = 'pending'), 0),
                    COALESCE(SUM(status = 'generated'), 0),
                    COALESCE(SUM(status = 'completed'), 0),
                    COALESCE(SUM(ai_tokens_used), 0),
                    COALESCE(SUM(ai_cost), 0.0),
                    COALESCE(SUM(human_time_seconds), 0)
             FROM activities",
            [],
            |row| {
                Ok(ActivityStats {
                    total: row.get(0)?,
                    pending: row.get(1)?,
                    generated: row.get(2)?,
                    completed: row.get(3)?,
                    total_tokens: row.get(4)?,
                    total_cost: row.get(5)?,
                    total_human_time_seconds: row.get(6)?,
                })
            },
        )?;
        Ok(stats)
    }
}
