//! Learning pattern repository.

use rusqlite::{Connection, params};

use crate::errors::Result;
use crate::ids::{DocumentId, PatternId};
use crate::sqlite::repositories::{query_all, query_first};
use crate::sqlite::row_helpers::{escape_like, parse_enum};
use crate::sqlite::row_types::{LearningPatternRow, PatternFrequency};
use crate::types::PatternType;

/// Fields of a new pattern.
pub struct NewPattern<'a> {
    /// Removal or insertion.
    pub pattern_type: PatternType,
    /// Context tag.
    pub context: &'a str,
    /// JSON correction payload.
    pub correction: &'a str,
    /// Document the pattern was learned from.
    pub learned_from_doc_id: Option<DocumentId>,
}

/// Learning pattern repository.
pub struct PatternRepo;

impl PatternRepo {
    /// Insert a pattern with `applied_count = 0`.
    pub fn insert(conn: &Connection, new: &NewPattern<'_>, now: &str) -> Result<PatternId> {
        let _ = conn.execute(
            "INSERT INTO learning_patterns
               (pattern_type, context, correction, learned_from_doc_id, created_at, applied_count)
             VALUES (?1, ?2, ?3, ?4, ?5, 0)",
            params![
                new.pattern_type.as_sql(),
                new.context,
                new.correction,
                new.learned_from_doc_id,
                now
            ],
        )?;
        Ok(PatternId(conn.last_insert_rowid()))
    }

    /// Fetch one pattern.
    pub fn get(conn: &Connection, id: PatternId) -> Result<Option<LearningPatternRow>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM learning_patterns WHERE id = ?1",
            LearningPatternRow::COLUMNS
        ))?;
        query_first(&mut stmt, [id], LearningPatternRow::from_row)
    }

    /// Up to `limit` patterns whose context contains `tag`, most applied
    /// first, ties by id.
    pub fn top_for_context(
        conn: &Connection,
        tag: &str,
        limit: u32,
    ) -> Result<Vec<LearningPatternRow>> {
        let pattern = format!("%{}%", escape_like(tag));
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM learning_patterns
             WHERE context LIKE ?1 ESCAPE '\\'
             ORDER BY applied_count DESC, id ASC
             LIMIT ?2",
            LearningPatternRow::COLUMNS
        ))?;
        query_all(&mut stmt, params![pattern, limit], LearningPatternRow::from_row)
    }

    /// Patterns learned from one document.
    pub fn for_document(conn: &Connection, id: DocumentId) -> Result<Vec<LearningPatternRow>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM learning_patterns WHERE learned_from_doc_id = ?1 ORDER BY id ASC",
            LearningPatternRow::COLUMNS
        ))?;
        query_all(&mut stmt, [id], LearningPatternRow::from_row)
    }

    /// Bump `applied_count` by one.
    pub fn increment_applied(conn: &Connection, id: PatternId) -> Result<usize> {
        let changed = conn.execute(
            "UPDATE learning_patterns SET applied_count = applied_count + 1 WHERE id = ?1",
            [id],
        )?;
        Ok(changed)
    }

    /// Patterns created at or after `since`, counted by type.
    pub fn frequency_since(conn: &Connection, since: &str) -> Result<Vec<PatternFrequency>> {
        let mut stmt = conn.prepare(
            "SELECT pattern_type, COUNT(*) FROM learning_patterns
             WHERE created_at >= ?1
             GROUP BY pattern_type ORDER BY pattern_type ASC",
        )?;
        query_all(&mut stmt, [since], |row| {
            let raw: String = row.get(0)?;
            Ok(PatternFrequency {
                pattern_type: parse_enum(&raw, "learning_patterns", "pattern_type")?,
                frequency: row.get(1)?,
            })
        })
    }
}
