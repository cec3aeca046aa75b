//! The cost governor.
//!
//! Month-to-date spend is always read back from the ledger's cost records;
//! the governor keeps no running total of its own, so repeated checks over
//! the same ledger state return the same tier.

use chrono::{DateTime, Datelike, NaiveTime, Utc};
use documenter_ledger::{Ledger, NewBudgetAlert};
use documenter_settings::BudgetSettings;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::errors::{GovernorError, Result};
use crate::tier::{Alert, BudgetTier, utilization};

/// Outcome of one budget check.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BudgetReport {
    /// Budget month, `YYYY-MM`.
    pub month: String,
    /// Month-to-date spend in USD.
    pub monthly_spent: f64,
    /// Monthly budget in USD.
    pub budget: f64,
    /// Budget left, floored at zero.
    pub remaining: f64,
    /// Percent of budget used.
    pub utilization: f64,
    /// Current tier.
    pub tier: BudgetTier,
    /// Alert for the current tier (empty when `OK`).
    pub alerts: Vec<Alert>,
    /// Force-local switch after this check.
    pub force_local: bool,
}

/// First instant of the UTC month containing `now`.
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let day = now.date_naive();
    day.with_day(1)
        .unwrap_or(day)
        .and_time(NaiveTime::MIN)
        .and_utc()
}

/// `YYYY-MM` key of the month containing `now`.
pub fn month_key(now: DateTime<Utc>) -> String {
    now.format("%Y-%m").to_string()
}

/// Budget checker bound to one ledger.
#[derive(Clone, Debug)]
pub struct CostGovernor {
    ledger: Ledger,
    monthly_budget: f64,
}

impl CostGovernor {
    /// Create a governor. The budget must be a finite amount above zero.
    pub fn new(ledger: Ledger, monthly_budget: f64) -> Result<Self> {
        if !monthly_budget.is_finite() || monthly_budget <= 0.0 {
            return Err(GovernorError::Config(format!(
                "monthly budget must be a positive amount, got {monthly_budget}"
            )));
        }
        Ok(Self {
            ledger,
            monthly_budget,
        })
    }

    /// Create a governor from budget settings.
    pub fn from_settings(ledger: Ledger, settings: &BudgetSettings) -> Result<Self> {
        Self::new(ledger, settings.monthly_budget)
    }

    /// Configured monthly budget.
    pub fn monthly_budget(&self) -> f64 {
        self.monthly_budget
    }

    /// Classify month-to-date spend as of `now`.
    ///
    /// `CRITICAL` turns the force-local switch on; lower tiers leave it as
    /// is. An alert record is written the first time a tier is reached in a
    /// month.
    #[instrument(skip(self), fields(budget = self.monthly_budget))]
    pub fn check(&self, now: DateTime<Utc>) -> Result<BudgetReport> {
        let month = month_key(now);
        let monthly_spent = self.ledger.spend_since(month_start(now))?;
        let utilization = utilization(monthly_spent, self.monthly_budget);
        let tier = BudgetTier::classify(utilization);
        let alert = Alert::for_tier(tier, utilization);

        if tier == BudgetTier::Critical {
            self.ledger.set_force_local(true)?;
            warn!(utilization, "budget critical, forcing local generation");
        }

        if let Some(alert) = &alert {
            if !self.ledger.alert_exists(&month, tier.as_str())? {
                let _ = self.ledger.insert_alert(&NewBudgetAlert {
                    month: &month,
                    level: tier.as_str(),
                    utilization,
                    monthly_spent,
                    budget: self.monthly_budget,
                    message: &alert.message,
                    recommended_action: &alert.recommended_action,
                })?;
                info!(level = %tier, %month, message = %alert.message, "budget tier reached");
            }
        }

        let force_local = self.ledger.budget_state()?.force_local;
        Ok(BudgetReport {
            month,
            monthly_spent,
            budget: self.monthly_budget,
            remaining: (self.monthly_budget - monthly_spent).max(0.0),
            utilization,
            tier,
            alerts: alert.into_iter().collect(),
            force_local,
        })
    }

    /// Turn the force-local switch off.
    #[instrument(skip(self))]
    pub fn clear_force_local(&self) -> Result<()> {
        self.ledger.set_force_local(false)?;
        info!("force-local cleared");
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;
    use documenter_ledger::ActivityId;
    use serde_json::json;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn setup() -> (Ledger, ActivityId) {
        let ledger = Ledger::in_memory().unwrap();
        let activity = ledger
            .create_activity("documentation_generation", "test", &json!({}))
            .unwrap();
        (ledger, activity)
    }

    fn spend(ledger: &Ledger, activity: ActivityId, amount: f64, at: DateTime<Utc>) {
        let _ = ledger
            .record_cost_at(activity, "openai", "gpt-4", 1_000, amount, at)
            .unwrap();
    }

    #[test]
    fn month_start_is_first_instant() {
        assert_eq!(month_start(ts(2024, 2, 29, 13)), ts(2024, 2, 1, 0));
        assert_eq!(month_start(ts(2024, 3, 1, 0)), ts(2024, 3, 1, 0));
        assert_eq!(month_key(ts(2024, 2, 29, 13)), "2024-02");
    }

    #[test]
    fn rejects_non_positive_budget() {
        let (ledger, _) = setup();
        assert_matches!(
            CostGovernor::new(ledger.clone(), 0.0),
            Err(GovernorError::Config(_))
        );
        assert_matches!(
            CostGovernor::new(ledger.clone(), -5.0),
            Err(GovernorError::Config(_))
        );
        assert_matches!(
            CostGovernor::new(ledger, f64::INFINITY),
            Err(GovernorError::Config(_))
        );
    }

    #[test]
    fn empty_ledger_is_ok_without_alerts() {
        let (ledger, _) = setup();
        let governor = CostGovernor::new(ledger, 50.0).unwrap();
        let report = governor.check(ts(2024, 1, 15, 0)).unwrap();
        assert_eq!(report.tier, BudgetTier::Ok);
        assert!(report.alerts.is_empty());
        assert!(!report.force_local);
        assert!((report.remaining - 50.0).abs() < 1e-12);
    }

    #[test]
    fn critical_persists_force_local() {
        let (ledger, act) = setup();
        spend(&ledger, act, 45.0, ts(2024, 1, 10, 0));
        let governor = CostGovernor::new(ledger.clone(), 50.0).unwrap();

        let report = governor.check(ts(2024, 1, 15, 0)).unwrap();
        assert_eq!(report.tier, BudgetTier::Critical);
        assert!(report.force_local);
        assert!(ledger.budget_state().unwrap().force_local);
        assert_eq!(report.alerts[0].message, "Budget exceeded: 90.0% used");
    }

    #[test]
    fn exactly_eighty_percent_is_warning() {
        let (ledger, act) = setup();
        spend(&ledger, act, 40.0, ts(2024, 1, 10, 0));
        let governor = CostGovernor::new(ledger.clone(), 50.0).unwrap();
        let report = governor.check(ts(2024, 1, 15, 0)).unwrap();
        assert_eq!(report.tier, BudgetTier::Warning);
        assert!(!report.force_local);
    }

    #[test]
    fn previous_month_spend_is_ignored() {
        let (ledger, act) = setup();
        spend(&ledger, act, 49.0, ts(2024, 1, 31, 23));
        spend(&ledger, act, 1.0, ts(2024, 2, 1, 0));
        let governor = CostGovernor::new(ledger, 50.0).unwrap();
        let report = governor.check(ts(2024, 2, 2, 0)).unwrap();
        assert_eq!(report.tier, BudgetTier::Ok);
        assert!((report.monthly_spent - 1.0).abs() < 1e-12);
    }

    #[test]
    fn lower_tiers_leave_force_local_set() {
        let (ledger, act) = setup();
        ledger.set_force_local(true).unwrap();
        spend(&ledger, act, 30.0, ts(2024, 1, 10, 0));
        let governor = CostGovernor::new(ledger, 50.0).unwrap();
        let report = governor.check(ts(2024, 1, 15, 0)).unwrap();
        assert_eq!(report.tier, BudgetTier::Info);
        assert!(report.force_local);
    }

    #[test]
    fn clear_force_local_is_explicit() {
        let (ledger, act) = setup();
        spend(&ledger, act, 48.0, ts(2024, 1, 10, 0));
        let governor = CostGovernor::new(ledger.clone(), 50.0).unwrap();
        let _ = governor.check(ts(2024, 1, 15, 0)).unwrap();
        governor.clear_force_local().unwrap();
        assert!(!ledger.budget_state().unwrap().force_local);
    }

    #[test]
    fn alert_recorded_once_per_tier_per_month() {
        let (ledger, act) = setup();
        spend(&ledger, act, 26.0, ts(2024, 1, 10, 0));
        let governor = CostGovernor::new(ledger.clone(), 50.0).unwrap();

        let first = governor.check(ts(2024, 1, 15, 0)).unwrap();
        let second = governor.check(ts(2024, 1, 16, 0)).unwrap();
        assert_eq!(first.tier, BudgetTier::Info);
        assert_eq!(second.alerts.len(), 1);
        assert_eq!(ledger.alerts_for_month("2024-01").unwrap().len(), 1);

        spend(&ledger, act, 15.0, ts(2024, 1, 17, 0));
        let third = governor.check(ts(2024, 1, 18, 0)).unwrap();
        assert_eq!(third.tier, BudgetTier::Warning);
        let levels: Vec<_> = ledger
            .alerts_for_month("2024-01")
            .unwrap()
            .into_iter()
            .map(|a| a.level)
            .collect();
        assert_eq!(levels, vec!["INFO", "WARNING"]);
    }

    #[test]
    fn check_is_repeatable() {
        let (ledger, act) = setup();
        spend(&ledger, act, 42.0, ts(2024, 1, 10, 0));
        let governor = CostGovernor::new(ledger, 50.0).unwrap();
        let a = governor.check(ts(2024, 1, 15, 0)).unwrap();
        let b = governor.check(ts(2024, 1, 15, 0)).unwrap();
        assert_eq!(a, b);
    }
}
