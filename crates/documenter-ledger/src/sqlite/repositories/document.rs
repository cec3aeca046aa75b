//! Document repository.
//!
//! Stage is never stored. Writers set the field that moves a document
//! forward; readers call [`DocumentRow::stage`].

use rusqlite::{Connection, params};

use crate::errors::Result;
use crate::ids::{ActivityId, DocumentId};
use crate::sqlite::repositories::{query_all, query_first};
use crate::sqlite::row_helpers::escape_like;
use crate::sqlite::row_types::{DocumentRow, ReviewSummary};
use crate::types::DocumentStage;

/// Fields of a newly generated document.
pub struct NewDocument<'a> {
    /// Owning activity.
    pub activity_id: ActivityId,
    /// Document type.
    pub doc_type: &'a str,
    /// Generated text.
    pub draft_content: &'a str,
    /// Generated filename.
    pub filename: &'a str,
}

/// Reconciled review outcome.
pub struct CompletedReview<'a> {
    /// Reviewed text.
    pub final_content: &'a str,
    /// Time the reviewer spent.
    pub review_time_seconds: i64,
    /// Quality score in `[0, 1]`.
    pub quality_score: f64,
}

/// Document repository.
pub struct DocumentRepo;

impl DocumentRepo {
    /// Insert a Draft document.
    pub fn insert(conn: &Connection, new: &NewDocument<'_>, now: &str) -> Result<DocumentId> {
        let _ = conn.execute(
            "INSERT INTO documents (activity_id, doc_type, draft_content, filename, generated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![new.activity_id, new.doc_type, new.draft_content, new.filename, now],
        )?;
        Ok(DocumentId(conn.last_insert_rowid()))
    }

    /// Fetch one document.
    pub fn get(conn: &Connection, id: DocumentId) -> Result<Option<DocumentRow>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM documents WHERE id = ?1",
            DocumentRow::COLUMNS
        ))?;
        query_first(&mut stmt, [id], DocumentRow::from_row)
    }

    /// Point the document at a review-area (or approved-area) file.
    pub fn set_review_filepath(conn: &Connection, id: DocumentId, path: &str) -> Result<usize> {
        let changed = conn.execute(
            "UPDATE documents SET review_filepath = ?2 WHERE id = ?1",
            params![id, path],
        )?;
        Ok(changed)
    }

    /// Store the reviewed text and review metrics.
    pub fn complete_review(
        conn: &Connection,
        id: DocumentId,
        review: &CompletedReview<'_>,
        now: &str,
    ) -> Result<usize> {
        let changed = conn.execute(
            "UPDATE documents
             SET final_content = ?2, reviewed_at = ?3, review_time_seconds = ?4, quality_score = ?5
             WHERE id = ?1",
            params![
                id,
                review.final_content,
                now,
                review.review_time_seconds,
                review.quality_score
            ],
        )?;
        Ok(changed)
    }

    /// Record the licensing-area file.
    pub fn mark_licensing_ready(
        conn: &Connection,
        id: DocumentId,
        path: &str,
        now: &str,
    ) -> Result<usize> {
        let changed = conn.execute(
            "UPDATE documents SET licensing_filepath = ?2, licensed_at = ?3 WHERE id = ?1",
            params![id, path, now],
        )?;
        Ok(changed)
    }

    /// Documents whose `filename` or `review_filepath` contains `needle`
    /// literally, highest id first.
    pub fn matching(conn: &Connection, needle: &str) -> Result<Vec<DocumentRow>> {
        let pattern = format!("%{}%", escape_like(needle));
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM documents
             WHERE filename LIKE ?1 ESCAPE '\\' OR review_filepath LIKE ?1 ESCAPE '\\'
             ORDER BY id DESC",
            DocumentRow::COLUMNS
        ))?;
        query_all(&mut stmt, [pattern], DocumentRow::from_row)
    }

    /// Documents currently in `stage`, oldest first.
    pub fn in_stage(conn: &Connection, stage: DocumentStage) -> Result<Vec<DocumentRow>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM documents ORDER BY id ASC",
            DocumentRow::COLUMNS
        ))?;
        let rows = query_all(&mut stmt, [], DocumentRow::from_row)?;
        Ok(rows.into_iter().filter(|d| d.stage() == stage).collect())
    }

    /// Pending-review documents generated at or before `cutoff`.
    pub fn pending_since_before(conn: &Connection, cutoff: &str) -> Result<Vec<DocumentRow>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM documents
             WHERE review_filepath IS NOT NULL AND generated_at <= ?1
             ORDER BY generated_at ASC, id ASC",
            DocumentRow::COLUMNS
        ))?;
        let rows = query_all(&mut stmt, [cutoff], DocumentRow::from_row)?;
        Ok(rows
            .into_iter()
            .filter(|d| d.stage() == DocumentStage::PendingReview)
            .collect())
    }

    /// Review count and mean review time for reviews completed since `since`.
    pub fn review_summary(conn: &Connection, since: &str) -> Result<ReviewSummary> {
        let summary = conn.query_row(
            "SELECT COUNT(*), AVG(review_time_seconds)
             FROM documents WHERE reviewed_at IS NOT NULL AND reviewed_at >= ?1",
            [since],
            |row| {
                Ok(ReviewSummary {
                    reviewed: row.get(0)?,
                    avg_review_seconds: row.get(1)?,
                })
            },
        )?;
        Ok(summary)
    }
}
