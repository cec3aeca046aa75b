//! Metadata blocks written around document bodies.
//!
//! Every block the engine writes is fenced by `---` lines and opens with
//! one of [`HEADER_MARKERS`]. [`strip_metadata_header`] removes exactly
//! those blocks, so a reviewer's own front matter survives.

use chrono::NaiveDate;

/// First line of every engine-written metadata block.
pub const HEADER_MARKERS: [&str; 3] = [
    "# DOCUMENT FOR REVIEW",
    "# REVIEW INSTRUCTIONS",
    "# REVIEWED DOCUMENT",
];

const FENCE: &str = "---";

const REVIEW_INSTRUCTIONS: &str = "\
# REVIEW INSTRUCTIONS
1. Check technical accuracy
2. Verify completeness for licensing
3. Mark sections needing clarification with [REVIEW]
4. Add licensing-specific details
5. Update any placeholder content";

/// Facts shown at the top of a review copy.
#[derive(Clone, Debug, PartialEq)]
pub struct ReviewHeader {
    /// Document id.
    pub doc_id: i64,
    /// Document type.
    pub doc_type: String,
    /// Generation timestamp.
    pub generated_at: String,
    /// Generation cost in USD.
    pub cost: f64,
    /// Tokens billed.
    pub tokens: i64,
    /// Model used.
    pub model: String,
}

impl ReviewHeader {
    /// Review copy: metadata block, instructions block, then the body.
    pub fn render(&self, body: &str) -> String {
        format!(
            "{FENCE}\n\
             # DOCUMENT FOR REVIEW\n\
             # ID: {}\n\
             # Type: {}\n\
             # Generated: {}\n\
             # Cost: ${:.6}\n\
             # Tokens: {}\n\
             # Model: {}\n\
             {FENCE}\n\
             {REVIEW_INSTRUCTIONS}\n\
             {FENCE}\n\
             \n\
             {body}\n",
            self.doc_id, self.doc_type, self.generated_at, self.cost, self.tokens, self.model
        )
    }
}

/// Provenance block of an approved file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Provenance {
    /// Document id.
    pub doc_id: i64,
    /// Document type.
    pub doc_type: String,
    /// Generation timestamp.
    pub generated_at: String,
    /// Review timestamp.
    pub reviewed_at: String,
    /// Reviewer name.
    pub reviewer: String,
    /// Reviewer's summary of changes.
    pub changes_summary: String,
}

impl Provenance {
    /// Approved file: provenance block then the reviewed body.
    pub fn render(&self, body: &str) -> String {
        format!(
            "{FENCE}\n\
             # REVIEWED DOCUMENT\n\
             # Original ID: {}\n\
             # Type: {}\n\
             # Generated: {}\n\
             # Reviewed: {}\n\
             # Reviewer: {}\n\
             # Changes: {}\n\
             {FENCE}\n\
             {body}\n",
            self.doc_id,
            self.doc_type,
            self.generated_at,
            self.reviewed_at,
            self.reviewer,
            self.changes_summary
        )
    }
}

/// Wrap a reviewed body for the licensing package.
pub fn render_licensing(body: &str, date: NaiveDate) -> String {
    let today = date.format("%Y-%m-%d");
    format!(
        "# SOFTWARE DOCUMENTATION FOR LICENSING\n\
         # Document Version: 1.0\n\
         # Preparation Date: {today}\n\
         # Confidential - For Licensee Review Only\n\
         \n\
         {body}\n\
         \n\
         {FENCE}\n\
         ## LICENSING ACKNOWLEDGMENT\n\
         \n\
         This document is part of the software licensing package.\n\
         All technical specifications are accurate as of the preparation date.\n\
         \n\
         **Contact:** Licensing Department\n\
         **Email:** licensing@yourcompany.com\n\
         **Effective Date:** {today}\n"
    )
}

fn is_fence(line: Option<&&str>) -> bool {
    line.is_some_and(|l| l.trim() == FENCE)
}

fn is_marker(line: Option<&&str>) -> bool {
    line.is_some_and(|l| HEADER_MARKERS.contains(&l.trim()))
}

/// Remove leading engine metadata blocks, then trim.
///
/// A block is a `---` line followed by a marker line, running to the next
/// `---` line. A closing fence directly followed by another marker opens the
/// next block. An unterminated block is left in place.
pub fn strip_metadata_header(content: &str) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let skip_blank = |mut i: usize| {
        while lines.get(i).is_some_and(|l| l.trim().is_empty()) {
            i += 1;
        }
        i
    };

    let mut body_start = 0;
    let mut i = skip_blank(0);
    while is_fence(lines.get(i)) && is_marker(lines.get(i + 1)) {
        let Some(close) = (i + 2..lines.len()).find(|&k| is_fence(lines.get(k))) else {
            break;
        };
        body_start = close + 1;
        i = if is_marker(lines.get(close + 1)) {
            close
        } else {
            skip_blank(close + 1)
        };
    }

    lines[body_start..].join("\n").trim().to_string()
}
