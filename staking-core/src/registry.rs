//! Validator pool registry
//!
//! Pools are created on registration and never deleted; deactivation only
//! stops new stakes. Commission is bounded by the configured maximum at
//! registration and on every update.

use crate::{
    types::{AccountId, ValidatorPool},
    Error, Result,
};
use std::collections::HashMap;

/// Registry of per-validator delegation pools
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatorRegistry {
    pools: HashMap<AccountId, ValidatorPool>,
}

impl ValidatorRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pool for `validator`.
    ///
    /// Fails with `InvalidAmount` when the commission exceeds
    /// `max_commission_bps` and with `AlreadyStaking` when a pool exists,
    /// active or not.
    pub fn register(
        &mut self,
        validator: AccountId,
        commission_rate_bps: u64,
        max_commission_bps: u64,
    ) -> Result<()> {
        if commission_rate_bps > max_commission_bps {
            return Err(Error::InvalidAmount(format!(
                "commission {} bps exceeds maximum {} bps",
                commission_rate_bps, max_commission_bps
            )));
        }
        if self.pools.contains_key(&validator) {
            return Err(Error::AlreadyStaking);
        }

        self.pools
            .insert(validator, ValidatorPool::new(commission_rate_bps));
        Ok(())
    }

    /// Update the commission rate of the caller's own pool
    pub fn update_commission(
        &mut self,
        validator: &AccountId,
        new_rate_bps: u64,
        max_commission_bps: u64,
    ) -> Result<()> {
        if new_rate_bps > max_commission_bps {
            return Err(Error::InvalidAmount(format!(
                "commission {} bps exceeds maximum {} bps",
                new_rate_bps, max_commission_bps
            )));
        }
        let pool = self.pools.get_mut(validator).ok_or(Error::InvalidValidator)?;
        pool.commission_rate_bps = new_rate_bps;
        Ok(())
    }

    /// Deactivate the caller's own pool; existing stakes remain valid
    pub fn deactivate(&mut self, validator: &AccountId) -> Result<()> {
        let pool = self.pools.get_mut(validator).ok_or(Error::InvalidValidator)?;
        pool.active = false;
        Ok(())
    }

    /// Pure lookup
    pub fn get(&self, validator: &AccountId) -> Option<&ValidatorPool> {
        self.pools.get(validator)
    }

    /// Mutable lookup for ledger-internal counter updates
    pub(crate) fn get_mut(&mut self, validator: &AccountId) -> Option<&mut ValidatorPool> {
        self.pools.get_mut(validator)
    }

    /// Lookup that requires the pool to accept new stakes
    pub(crate) fn get_active_mut(&mut self, validator: &AccountId) -> Result<&mut ValidatorPool> {
        match self.pools.get_mut(validator) {
            Some(pool) if pool.active => Ok(pool),
            _ => Err(Error::InvalidValidator),
        }
    }

    /// Iterate all pools (read-only projection)
    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &ValidatorPool)> {
        self.pools.iter()
    }
}
