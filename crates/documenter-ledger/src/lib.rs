//! # documenter-ledger
//!
//! Append-mostly `SQLite` store for the document governance engine.
//!
//! - **Activities**: one row per unit of requested work, with cached cost totals
//! - **Documents**: generated drafts and their review/licensing progress
//! - **Cost records**: append-only spend rows (the authoritative spend figure)
//! - **Learning patterns / insights**: written by the pattern-learning engine
//! - **Budget state / alerts**: written by the cost governor
//!
//! The [`Ledger`] context object owns an `r2d2` pool. Every write is a
//! single statement committed immediately; there are no cross-statement
//! transactions and no row locking. The schema is created by versioned
//! migrations that run once when the ledger is opened.

#![deny(unsafe_code)]

pub mod errors;
pub mod ids;
pub mod ledger;
pub mod sqlite;
pub mod types;

pub use errors::{LedgerError, Result};
pub use ids::{ActivityId, AlertId, CostRecordId, DocumentId, InsightId, PatternId};
pub use ledger::Ledger;
pub use sqlite::connection::ConnectionConfig;
pub use sqlite::repositories::budget::NewBudgetAlert;
pub use sqlite::repositories::pattern::NewPattern;
pub use sqlite::row_helpers::format_ts;
pub use sqlite::row_types::{
    ActivityRow, ActivityStats, BudgetAlertRow, BudgetStateRow, CostRecordRow, CostTotals,
    DailyCost, DocumentRow, InsightRow, LearningPatternRow, PatternFrequency, ReviewSummary,
};
pub use types::{ActivityStatus, DocumentStage, PatternType};
