//! Budget tiers and the alerts attached to them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Utilization band. Ordered from least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BudgetTier {
    /// Below 50%.
    Ok,
    /// 50% up to 80%.
    Info,
    /// 80% up to 90%.
    Warning,
    /// 90% and above.
    Critical,
}

impl BudgetTier {
    /// Tier for a utilization percentage. Lower bounds are inclusive.
    pub fn classify(utilization: f64) -> Self {
        if utilization >= 90.0 {
            Self::Critical
        } else if utilization >= 80.0 {
            Self::Warning
        } else if utilization >= 50.0 {
            Self::Info
        } else {
            Self::Ok
        }
    }

    /// Upper-case name used in alert records.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }

    /// Process exit code for automation: 1 critical, 2 warning, 0 otherwise.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Critical => 1,
            Self::Warning => 2,
            Self::Ok | Self::Info => 0,
        }
    }
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percent of `budget` consumed by `spent`.
pub fn utilization(spent: f64, budget: f64) -> f64 {
    spent / budget * 100.0
}

/// Operator-facing alert for a tier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Tier that produced the alert.
    pub level: BudgetTier,
    /// What happened.
    pub message: String,
    /// What to do about it.
    pub recommended_action: String,
}

impl Alert {
    /// Alert for `tier` at `utilization` percent. `OK` has none.
    pub fn for_tier(tier: BudgetTier, utilization: f64) -> Option<Self> {
        let (message, action) = match tier {
            BudgetTier::Ok => return None,
            BudgetTier::Info => (
                format!("Budget tracking: {utilization:.1}% used"),
                "Continue monitoring",
            ),
            BudgetTier::Warning => (
                format!("Budget warning: {utilization:.1}% used"),
                "Consider reviewing cost optimization recommendations",
            ),
            BudgetTier::Critical => (
                format!("Budget exceeded: {utilization:.1}% used"),
                "All new requests will use local models",
            ),
        };
        Some(Self {
            level: tier,
            message,
            recommended_action: action.to_string(),
        })
    }
}
