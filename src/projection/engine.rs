//! Core projection engine for fixed deposit maturity and early-exit figures

use chrono::{Days, Months, NaiveDate};
use rayon::prelude::*;

use super::result::{round2, DepositResult, EarlyWithdrawal};
use crate::deposit::{DepositInput, TenureType};
use crate::error::{FdError, FdResult};

/// Default minimum principal for a deposit to be projected
pub const DEFAULT_MINIMUM_PRINCIPAL: f64 = 100_000.0;

/// Share of interest forfeited on early exit
pub const PENALTY_RATE: f64 = 0.20;

/// Compounding periods per year used for every early-withdrawal quote,
/// whatever the deposit's own frequency
pub const EARLY_EXIT_PERIODS_PER_YEAR: u32 = 4;

/// Day count of the interest year
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Configuration for the engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Principals below this produce the zero result
    pub minimum_principal: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            minimum_principal: DEFAULT_MINIMUM_PRINCIPAL,
        }
    }
}

/// Fixed deposit projection engine
///
/// All operations are pure: the only inputs are the arguments and the
/// configuration captured at construction.
#[derive(Debug, Clone, Default)]
pub struct DepositEngine {
    config: EngineConfig,
}

impl DepositEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Project a deposit to maturity.
    ///
    /// Inputs below the minimum principal return [`DepositResult::zero`]
    /// instead of a partial computation.
    pub fn project(&self, input: &DepositInput) -> DepositResult {
        if input.principal < self.config.minimum_principal {
            log::debug!(
                "Principal {:.2} below minimum {:.2}, returning zero result",
                input.principal,
                self.config.minimum_principal
            );
            return DepositResult::zero(input.start_date);
        }

        let periods = input.compounding_frequency.periods_per_year();
        let maturity_amount = compound(input.principal, input.rate, periods, input.tenure_years());
        let total_interest = round2(maturity_amount - input.principal);
        let penalty_amount = round2(total_interest * PENALTY_RATE);
        let early_exit_amount = round2(input.principal + total_interest - penalty_amount);

        let maturity_date = maturity_date(input.start_date, input.tenure_value, input.tenure_type)
            .unwrap_or_else(|| {
                log::warn!(
                    "Maturity date out of range for {} + {} {}, using start date",
                    input.start_date,
                    input.tenure_value,
                    input.tenure_type
                );
                input.start_date
            });

        log::debug!(
            "Projected {:.2} at {}% for {} {} ({}x/yr): maturity {:.2} on {}",
            input.principal,
            input.rate,
            input.tenure_value,
            input.tenure_type,
            periods,
            maturity_amount,
            maturity_date
        );

        DepositResult {
            maturity_amount: round2(maturity_amount),
            total_interest,
            maturity_date,
            penalty_amount,
            early_exit_amount,
        }
    }

    /// Project an input that is about to be kept or shown as final.
    ///
    /// Unlike [`project`](Self::project), a principal below the minimum is
    /// an error rather than the zero sentinel, and amounts that overflow
    /// are refused.
    pub fn checked_project(&self, input: &DepositInput) -> FdResult<DepositResult> {
        input.validate()?;

        if input.principal < self.config.minimum_principal {
            return Err(FdError::invalid(
                "principal",
                format!("minimum deposit is {:.2}", self.config.minimum_principal),
            ));
        }

        let result = self.project(input);
        if !result.is_finite() {
            return Err(FdError::invalid(
                "tenure_value",
                format!(
                    "{} {} at {}% grows beyond representable amounts",
                    input.tenure_value, input.tenure_type, input.rate
                ),
            ));
        }
        Ok(result)
    }

    /// Project many deposits in parallel, preserving order
    pub fn project_batch(&self, inputs: &[DepositInput]) -> Vec<DepositResult> {
        inputs.par_iter().map(|input| self.project(input)).collect()
    }

    /// Interest and payout for withdrawing on `withdrawal_date`.
    ///
    /// Always compounds quarterly over a 365-day year. Withdrawing on or
    /// before the start date returns the principal with nothing accrued.
    pub fn early_withdrawal(
        &self,
        principal: f64,
        rate: f64,
        start_date: NaiveDate,
        withdrawal_date: NaiveDate,
    ) -> EarlyWithdrawal {
        if withdrawal_date <= start_date {
            return EarlyWithdrawal {
                accrued_interest: 0.0,
                penalty: 0.0,
                payout: round2(principal),
            };
        }

        let elapsed_days = (withdrawal_date - start_date).num_days() as f64;
        let years = elapsed_days / DAYS_PER_YEAR;
        let amount = compound(principal, rate, EARLY_EXIT_PERIODS_PER_YEAR, years);

        let accrued_interest = round2(amount - principal);
        let penalty = round2(accrued_interest * PENALTY_RATE);
        let payout = round2(principal + accrued_interest - penalty);

        EarlyWithdrawal {
            accrued_interest,
            penalty,
            payout,
        }
    }
}

/// A = P(1 + r/n)^(nt), with r in percent
fn compound(principal: f64, rate_pct: f64, periods_per_year: u32, years: f64) -> f64 {
    let n = periods_per_year as f64;
    principal * (1.0 + rate_pct / 100.0 / n).powf(n * years)
}

/// Advance `start` by the tenure using calendar arithmetic.
///
/// Month and year steps clamp to the last day of a shorter target month
/// (Jan 31 + 1 month = Feb 28/29). Returns `None` if the date leaves
/// chrono's representable range.
pub fn maturity_date(start: NaiveDate, tenure_value: u32, tenure_type: TenureType) -> Option<NaiveDate> {
    match tenure_type {
        TenureType::Years => start.checked_add_months(Months::new(tenure_value.checked_mul(12)?)),
        TenureType::Months => start.checked_add_months(Months::new(tenure_value)),
        TenureType::Days => start.checked_add_days(Days::new(tenure_value as u64)),
    }
}
