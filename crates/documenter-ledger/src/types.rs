//! Domain enums stored as text columns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of an activity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    /// Created, no cost logged yet.
    Pending,
    /// At least one cost record has been appended.
    Generated,
    /// A document of this activity finished review.
    Completed,
}

impl ActivityStatus {
    /// Column value.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Generated => "generated",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for ActivityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "generated" => Ok(Self::Generated),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown activity status: {other}")),
        }
    }
}

/// Review stage of a document, derived from which fields are populated.
///
/// Never stored; see [`DocumentRow::stage`](crate::DocumentRow::stage).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStage {
    /// Generated, not yet placed in the review area.
    Draft,
    /// Review copy written, waiting for the reviewer.
    PendingReview,
    /// Reviewed content reconciled into the ledger.
    Reviewed,
    /// Wrapped for licensing. Terminal.
    LicensingReady,
}

impl DocumentStage {
    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingReview => "pending_review",
            Self::Reviewed => "reviewed",
            Self::LicensingReady => "licensing_ready",
        }
    }
}

impl fmt::Display for DocumentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "pending_review" => Ok(Self::PendingReview),
            "reviewed" => Ok(Self::Reviewed),
            "licensing_ready" => Ok(Self::LicensingReady),
            other => Err(format!("unknown document stage: {other}")),
        }
    }
}

/// Kind of correction captured by the learning engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    /// Reviewers deleted these lines.
    ContentRemoved,
    /// Reviewers inserted these lines.
    ContentAdded,
}

impl PatternType {
    /// Column value.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::ContentRemoved => "content_removed",
            Self::ContentAdded => "content_added",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for PatternType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "content_removed" => Ok(Self::ContentRemoved),
            "content_added" => Ok(Self::ContentAdded),
            other => Err(format!("unknown pattern type: {other}")),
        }
    }
}
