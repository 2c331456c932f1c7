//! Aggregate figures across saved deposits

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::deposit::SavedDeposit;
use crate::timing::{progress, start_of_day_utc, time_remaining, TimeRemaining};

/// Totals over a set of deposits
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub deposit_count: usize,
    /// Sum of maturity amounts
    pub total_value: f64,
    pub total_principal: f64,
    /// total_value - total_principal
    pub total_interest: f64,
    /// Interest over principal, in percent (0 with no principal)
    pub yield_pct: f64,
}

impl PortfolioSummary {
    pub fn from_deposits(deposits: &[SavedDeposit]) -> Self {
        let total_value: f64 = deposits.iter().map(|d| d.result.maturity_amount).sum();
        let total_principal: f64 = deposits.iter().map(|d| d.input.principal).sum();
        let total_interest = total_value - total_principal;
        let yield_pct = if total_principal > 0.0 {
            total_interest / total_principal * 100.0
        } else {
            0.0
        };

        Self {
            deposit_count: deposits.len(),
            total_value,
            total_principal,
            total_interest,
            yield_pct,
        }
    }
}

/// Deposit with the earliest maturity still in the future
pub fn nearest_active(deposits: &[SavedDeposit], now: DateTime<Utc>) -> Option<&SavedDeposit> {
    deposits
        .iter()
        .filter(|d| start_of_day_utc(d.maturity_date()) > now)
        .min_by_key(|d| d.maturity_date())
}

/// Live status of one deposit at `now`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositStatus {
    pub id: String,
    pub title: String,
    pub progress_pct: f64,
    pub remaining: TimeRemaining,
}

impl DepositStatus {
    pub fn at(deposit: &SavedDeposit, now: DateTime<Utc>) -> Self {
        Self {
            id: deposit.id.clone(),
            title: deposit.display_title(),
            progress_pct: progress(deposit.start_date(), deposit.maturity_date(), now),
            remaining: time_remaining(deposit.maturity_date(), now),
        }
    }
}
