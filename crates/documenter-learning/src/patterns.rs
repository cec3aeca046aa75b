//! Pattern extraction from reviewer edits.

use documenter_ledger::PatternType;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::diff::{DiffLine, unified_diff};

const CONTEXT_LINES: usize = 3;
const MAX_EXAMPLES: usize = 3;
const FINGERPRINT_LINES: usize = 2;
const FINGERPRINT_HEX_LEN: usize = 10;

/// One correction pattern, stored as the JSON `correction` payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRecord {
    /// Removal or insertion.
    #[serde(rename = "type")]
    pub pattern_type: PatternType,
    /// Up to three changed lines, in document order.
    pub examples: Vec<String>,
    /// Number of changed lines of this type.
    pub count: usize,
    /// Short hash of the first two changed lines.
    #[serde(rename = "hash")]
    pub fingerprint: String,
}

/// Context tag stored with patterns learned from a document type.
pub fn context_tag(doc_type: &str) -> String {
    format!("Doc type: {doc_type}")
}

/// First ten hex characters of SHA-256 over `lines` joined by newlines.
pub fn fingerprint(lines: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(lines.join("\n").as_bytes());
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(FINGERPRINT_HEX_LEN);
    hex
}

/// Extract at most two patterns from a reviewer's revision: removed lines
/// first, then added lines. Identical texts yield nothing.
pub fn extract_patterns(original: &str, revised: &str) -> Vec<PatternRecord> {
    let mut removed = Vec::new();
    let mut added = Vec::new();
    for hunk in unified_diff(original, revised, CONTEXT_LINES) {
        for line in hunk.lines {
            match line {
                DiffLine::Removed(text) => removed.push(text),
                DiffLine::Added(text) => added.push(text),
                DiffLine::Context(_) => {}
            }
        }
    }

    [
        (PatternType::ContentRemoved, removed),
        (PatternType::ContentAdded, added),
    ]
    .into_iter()
    .filter(|(_, lines)| !lines.is_empty())
    .map(|(pattern_type, lines)| PatternRecord {
        pattern_type,
        examples: lines
            .iter()
            .take(MAX_EXAMPLES)
            .map(|l| (*l).to_string())
            .collect(),
        count: lines.len(),
        fingerprint: fingerprint(&lines[..lines.len().min(FINGERPRINT_LINES)]),
    })
    .collect()
}
