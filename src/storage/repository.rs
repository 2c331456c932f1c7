//! Saved deposits and the user profile on top of a key/value store

use crate::deposit::{DepositInput, SavedDeposit, UserProfile};
use crate::error::{FdError, FdResult};
use crate::projection::DepositEngine;

use super::KeyValueStore;

/// Key holding the JSON array of saved deposits, newest first
pub const DEPOSITS_KEY: &str = "smart_fd_investments";

/// Key holding the JSON user profile
pub const PROFILE_KEY: &str = "smart_fd_profile";

/// Save/delete/reset interface over stored deposits.
///
/// Every write replaces the whole collection. Records are never edited
/// in place.
#[derive(Debug)]
pub struct DepositRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> DepositRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// All saved deposits, newest first. Unreadable data counts as empty.
    pub fn list(&self) -> FdResult<Vec<SavedDeposit>> {
        let Some(raw) = self.store.get(DEPOSITS_KEY)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(deposits) => Ok(deposits),
            Err(e) => {
                log::warn!("Ignoring unreadable saved deposits: {}", e);
                Ok(Vec::new())
            }
        }
    }

    pub fn get(&self, id: &str) -> FdResult<SavedDeposit> {
        self.list()?
            .into_iter()
            .find(|d| d.id == id)
            .ok_or_else(|| FdError::NotFound(id.to_string()))
    }

    /// Store a new record in front of the existing ones
    pub fn save(&mut self, deposit: SavedDeposit) -> FdResult<()> {
        deposit.input.validate()?;
        if !deposit.result.is_finite() {
            return Err(FdError::invalid(
                "result",
                format!("deposit {} has non-finite amounts", deposit.id),
            ));
        }

        let mut deposits = self.list()?;
        if deposits.iter().any(|d| d.id == deposit.id) {
            return Err(FdError::DuplicateId(deposit.id));
        }

        log::info!(
            "Saving deposit {} ({:.2} maturing {})",
            deposit.id,
            deposit.principal(),
            deposit.maturity_date()
        );
        deposits.insert(0, deposit);
        self.write(&deposits)
    }

    /// Project `input`, then save it under `id`.
    ///
    /// Inputs below the minimum principal, or whose amounts overflow, are
    /// refused.
    pub fn save_new(
        &mut self,
        engine: &DepositEngine,
        input: DepositInput,
        id: impl Into<String>,
        created_at: i64,
    ) -> FdResult<SavedDeposit> {
        let result = engine.checked_project(&input)?;
        let deposit = SavedDeposit::new(id, input, result, created_at);
        self.save(deposit.clone())?;
        Ok(deposit)
    }

    /// Remove a record by id, returning it
    pub fn delete(&mut self, id: &str) -> FdResult<SavedDeposit> {
        let mut deposits = self.list()?;
        let index = deposits
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| FdError::NotFound(id.to_string()))?;

        let removed = deposits.remove(index);
        self.write(&deposits)?;
        log::info!("Deleted deposit {}", id);
        Ok(removed)
    }

    /// Delete every saved deposit, returning how many there were
    pub fn reset(&mut self) -> FdResult<usize> {
        let count = self.list()?.len();
        self.write(&[])?;
        log::info!("Reset saved deposits ({} removed)", count);
        Ok(count)
    }

    pub fn profile(&self) -> FdResult<Option<UserProfile>> {
        let Some(raw) = self.store.get(PROFILE_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                log::warn!("Ignoring unreadable profile: {}", e);
                Ok(None)
            }
        }
    }

    pub fn save_profile(&mut self, profile: &UserProfile) -> FdResult<()> {
        let json = serde_json::to_string(profile)?;
        self.store.set(PROFILE_KEY, &json)
    }

    /// Replace the stored collection. A non-finite amount would be written
    /// as `null` and make the whole array unreadable, so it is refused.
    fn write(&mut self, deposits: &[SavedDeposit]) -> FdResult<()> {
        if let Some(bad) = deposits
            .iter()
            .find(|d| !d.result.is_finite() || !d.input.principal.is_finite())
        {
            return Err(FdError::Storage(format!(
                "refusing to write non-finite amounts for deposit {}",
                bad.id
            )));
        }
        let json = serde_json::to_string(deposits)?;
        self.store.set(DEPOSITS_KEY, &json)
    }
}
