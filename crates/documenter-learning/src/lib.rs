//! # documenter-learning
//!
//! Turns the difference between a generated draft and its reviewed version
//! into stored correction patterns, flags new drafts that repeat known
//! mistakes, and summarises review activity as insights.
//!
//! Pattern application never edits content. It returns the draft unchanged
//! together with suggestions for the reviewer.

#![deny(unsafe_code)]

pub mod diff;
pub mod engine;
pub mod errors;
pub mod patterns;

pub use engine::{AppliedPatterns, Insight, LearningEngine, Suggestion, SuggestionKind};
pub use errors::{LearningError, Result};
pub use patterns::{PatternRecord, context_tag, extract_patterns, fingerprint};
