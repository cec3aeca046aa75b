//! Ties a submitted reviewed file back to its ledger document.
//!
//! Reviewers return files under varied names (`reviewed_x.md`,
//! `review_x.md`, the original name). Candidate substrings are derived from
//! the basename and tried in a fixed order; the highest-id document matching
//! the first productive candidate wins. Two documents whose filenames
//! overlap can therefore resolve to the newer one.

use std::path::Path;

use documenter_ledger::{DocumentRow, Ledger};
use tracing::debug;

use crate::errors::MatchError;

/// Basename with one leading `review_` removed, else one leading
/// `reviewed_` removed.
pub fn canonical_name(basename: &str) -> &str {
    basename
        .strip_prefix("review_")
        .or_else(|| basename.strip_prefix("reviewed_"))
        .unwrap_or(basename)
}

/// Candidate substrings for `basename`, in the order they are tried.
/// Duplicates are kept so the list reports exactly what was attempted.
pub fn candidate_patterns(basename: &str) -> Vec<String> {
    let canonical = canonical_name(basename);
    vec![
        canonical.to_string(),
        basename.to_string(),
        canonical.replace("reviewed_", ""),
        canonical.replace("review_", ""),
    ]
}

/// Resolve a submitted file to the document it reviews.
pub fn resolve_document(ledger: &Ledger, submitted: &Path) -> Result<DocumentRow, MatchError> {
    let basename = submitted
        .file_name()
        .map_or_else(|| submitted.to_string_lossy(), |n| n.to_string_lossy())
        .into_owned();
    // An empty substring would match everything; it is neither searched nor reported.
    let tried: Vec<String> = candidate_patterns(&basename)
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect();

    for pattern in &tried {
        if let Some(doc) = ledger.documents_matching(pattern)?.into_iter().next() {
            debug!(%pattern, document = %doc.id, "submitted file matched");
            return Ok(doc);
        }
    }

    Err(MatchError::NoMatch {
        submitted: basename,
        tried,
    })
}
