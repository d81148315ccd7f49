//! Yield-farming positions
//!
//! Locked liquid tokens keep appreciating through the exchange rate like
//! any other holding; a position only takes the tokens out of circulation
//! for its lock period. Positions follow the same append-only, per-user
//! sequential-id discipline as unstaking requests.

use serde::{Deserialize, Serialize};
use staking_core::AccountId;
use std::collections::HashMap;

/// A locked farming position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmPosition {
    /// Liquid tokens locked
    pub amount: u64,

    /// Height at which the lock started
    pub start_height: u64,

    /// Lock duration in blocks
    pub period_blocks: u64,

    /// Whether the position has been withdrawn (terminal, never reset)
    pub withdrawn: bool,
}

impl FarmPosition {
    /// First height at which the position can be withdrawn
    pub fn unlock_height(&self) -> u64 {
        self.start_height.saturating_add(self.period_blocks)
    }
}

/// Per-user sequences of farming positions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FarmRegistry {
    positions: HashMap<(AccountId, u64), FarmPosition>,
    next_id: HashMap<AccountId, u64>,
}

impl FarmRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a position for `user` at the next sequential id
    pub fn push(&mut self, user: &AccountId, position: FarmPosition) -> u64 {
        let counter = self.next_id.entry(user.clone()).or_insert(0);
        let id = *counter;
        *counter += 1;
        self.positions.insert((user.clone(), id), position);
        id
    }

    /// Pure lookup
    pub fn get(&self, user: &AccountId, id: u64) -> Option<&FarmPosition> {
        self.positions.get(&(user.clone(), id))
    }

    /// Mutable lookup for withdrawal
    pub(crate) fn get_mut(&mut self, user: &AccountId, id: u64) -> Option<&mut FarmPosition> {
        self.positions.get_mut(&(user.clone(), id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(amount: u64) -> FarmPosition {
        FarmPosition {
            amount,
            start_height: 100,
            period_blocks: 144,
            withdrawn: false,
        }
    }

    #[test]
    fn test_ids_are_sequential_per_user() {
        let mut registry = FarmRegistry::new();
        let alice = AccountId::new("ST2ALICE");
        let bob = AccountId::new("ST3BOB");

        assert_eq!(registry.push(&alice, position(100)), 0);
        assert_eq!(registry.push(&alice, position(200)), 1);
        assert_eq!(registry.push(&bob, position(300)), 0);

        assert_eq!(registry.get(&alice, 1).unwrap().amount, 200);
        assert_eq!(registry.get(&bob, 0).unwrap().amount, 300);
        assert!(registry.get(&bob, 1).is_none());
    }

    #[test]
    fn test_unlock_height() {
        let position = position(100);
        assert_eq!(position.unlock_height(), 244);
    }
}
