//! Review workflow settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// File staging and review defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewSettings {
    /// Root of the `review/`, `approved/` and `licensing_ready/` areas.
    pub docs_dir: PathBuf,
    /// Review duration recorded when the submitter does not supply one.
    pub default_review_seconds: i64,
    /// Quality score recorded when the submitter does not supply one.
    pub default_quality_score: f64,
    /// Documents pending review longer than this are reported as stuck.
    pub stuck_after_hours: i64,
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("docs"),
            default_review_seconds: 300,
            default_quality_score: 0.8,
            stuck_after_hours: 48,
        }
    }
}
