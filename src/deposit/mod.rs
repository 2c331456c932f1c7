//! Deposit data structures and CSV import

mod data;
pub mod loader;

pub use data::{CompoundingFrequency, DepositInput, SavedDeposit, TenureType, UserProfile};
pub use loader::{load_deposits, load_deposits_from_reader};
