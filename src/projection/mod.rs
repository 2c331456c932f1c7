//! Projection engine for maturity and early-withdrawal figures

mod engine;
mod result;

pub use engine::{
    maturity_date, DepositEngine, EngineConfig, DAYS_PER_YEAR, DEFAULT_MINIMUM_PRINCIPAL,
    EARLY_EXIT_PERIODS_PER_YEAR, PENALTY_RATE,
};
pub use result::{round2, DepositResult, EarlyWithdrawal};
