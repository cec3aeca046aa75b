//! # documenter-governor
//!
//! Classifies month-to-date AI spend against the configured budget.
//!
//! - [`BudgetTier::classify`] is a pure function of utilization.
//! - [`CostGovernor::check`] reads spend from the ledger's cost records,
//!   persists the force-local switch on `CRITICAL`, and records one alert
//!   per tier per month.
//! - [`pricing::calculate_cost`] converts token counts into USD.

#![deny(unsafe_code)]

pub mod errors;
pub mod governor;
pub mod pricing;
pub mod tier;

pub use errors::{GovernorError, Result};
pub use governor::{BudgetReport, CostGovernor, month_key, month_start};
pub use pricing::calculate_cost;
pub use tier::{Alert, BudgetTier, utilization};
