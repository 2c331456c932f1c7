//! Fixed Deposit Planner - maturity projections for fixed deposits
//!
//! This library provides:
//! - Compound maturity projection with a 20% early-exit penalty preview
//! - Early-withdrawal payouts for an arbitrary withdrawal date
//! - Countdown and progress figures, plus a live countdown ticker
//! - Local persistence of saved deposits and the holder's profile
//! - Portfolio totals, printable certificates and advisory commentary

pub mod advisory;
pub mod config;
pub mod deposit;
pub mod error;
pub mod format;
pub mod portfolio;
pub mod projection;
pub mod storage;
pub mod timing;

// Re-export commonly used types
pub use config::Config;
pub use deposit::{CompoundingFrequency, DepositInput, SavedDeposit, TenureType, UserProfile};
pub use error::{FdError, FdResult};
pub use portfolio::PortfolioSummary;
pub use projection::{DepositEngine, DepositResult, EarlyWithdrawal, EngineConfig};
pub use storage::DepositRepository;
pub use timing::{progress, time_remaining, CountdownTicker, TimeRemaining};
