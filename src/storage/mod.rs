//! Local persistence of saved deposits and the user profile

mod repository;
mod store;

pub use repository::{DepositRepository, DEPOSITS_KEY, PROFILE_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore};
