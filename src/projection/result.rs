//! Projection output structures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Round a monetary amount to cents, half away from zero
pub fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Maturity projection for a single deposit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositResult {
    /// Principal grown to the maturity date
    pub maturity_amount: f64,

    /// maturity_amount - principal
    pub total_interest: f64,

    pub maturity_date: NaiveDate,

    /// Penalty charged on the full interest for an early exit
    pub penalty_amount: f64,

    /// principal + total_interest - penalty_amount
    pub early_exit_amount: f64,
}

impl DepositResult {
    /// Sentinel for inputs that are not yet a valid deposit
    pub fn zero(start_date: NaiveDate) -> Self {
        Self {
            maturity_amount: 0.0,
            total_interest: 0.0,
            maturity_date: start_date,
            penalty_amount: 0.0,
            early_exit_amount: 0.0,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.maturity_amount == 0.0
            && self.total_interest == 0.0
            && self.penalty_amount == 0.0
            && self.early_exit_amount == 0.0
    }

    /// Whether every amount is a real number. Long tenures at high rates
    /// overflow to infinity, which JSON cannot hold.
    pub fn is_finite(&self) -> bool {
        self.maturity_amount.is_finite()
            && self.total_interest.is_finite()
            && self.penalty_amount.is_finite()
            && self.early_exit_amount.is_finite()
    }
}

/// Payout for withdrawing on an arbitrary date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarlyWithdrawal {
    pub accrued_interest: f64,
    pub penalty: f64,
    pub payout: f64,
}

impl EarlyWithdrawal {
    /// Growth of the payout over the principal, in percent
    pub fn growth_pct(&self, principal: f64) -> f64 {
        if principal == 0.0 {
            0.0
        } else {
            (self.payout - principal) / principal * 100.0
        }
    }

    /// Share of the accrued interest lost to the penalty, in percent
    pub fn penalty_share_pct(&self) -> f64 {
        if self.accrued_interest > 0.0 {
            self.penalty / self.accrued_interest * 100.0
        } else {
            0.0
        }
    }

    /// Days left on the term at the withdrawal date, never negative
    pub fn remaining_days(maturity_date: NaiveDate, withdrawal_date: NaiveDate) -> i64 {
        (maturity_date - withdrawal_date).num_days().max(0)
    }
}
