//! Unstaking request queue
//!
//! Append-only collection keyed by (user, sequence number). Ids start at
//! zero per user, advance monotonically via an explicit counter, and are
//! never reused. Requests reach a terminal `completed` state and are never
//! deleted.

use crate::types::{AccountId, UnstakingRequest};
use std::collections::HashMap;

/// Per-user sequences of unstaking requests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnstakingQueue {
    requests: HashMap<(AccountId, u64), UnstakingRequest>,
    next_id: HashMap<AccountId, u64>,
}

impl UnstakingQueue {
    /// Empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request for `user` at the next sequential id
    pub fn push(&mut self, user: &AccountId, request: UnstakingRequest) -> u64 {
        let counter = self.next_id.entry(user.clone()).or_insert(0);
        let id = *counter;
        *counter += 1;
        self.requests.insert((user.clone(), id), request);
        id
    }

    /// Pure lookup
    pub fn get(&self, user: &AccountId, id: u64) -> Option<&UnstakingRequest> {
        self.requests.get(&(user.clone(), id))
    }

    /// Mutable lookup for completion
    pub(crate) fn get_mut(&mut self, user: &AccountId, id: u64) -> Option<&mut UnstakingRequest> {
        self.requests.get_mut(&(user.clone(), id))
    }

    /// Next id that would be assigned to `user`
    pub fn next_id(&self, user: &AccountId) -> u64 {
        self.next_id.get(user).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(amount: u64) -> UnstakingRequest {
        UnstakingRequest {
            amount,
            liquid_tokens: amount,
            initiated_height: 10,
            completed: false,
            validator: AccountId::new("ST1VALIDATOR"),
            stx_principal: amount,
        }
    }

    #[test]
    fn test_ids_are_sequential_from_zero() {
        let mut queue = UnstakingQueue::new();
        let user = AccountId::new("ST2USER");

        assert_eq!(queue.next_id(&user), 0);
        assert_eq!(queue.push(&user, request(100)), 0);
        assert_eq!(queue.push(&user, request(200)), 1);
        assert_eq!(queue.push(&user, request(300)), 2);
        assert_eq!(queue.next_id(&user), 3);

        assert_eq!(queue.get(&user, 0).unwrap().amount, 100);
        assert_eq!(queue.get(&user, 2).unwrap().amount, 300);
        assert!(queue.get(&user, 3).is_none());
    }

    #[test]
    fn test_sequences_are_per_user() {
        let mut queue = UnstakingQueue::new();
        let alice = AccountId::new("ST2ALICE");
        let bob = AccountId::new("ST3BOB");

        assert_eq!(queue.push(&alice, request(100)), 0);
        assert_eq!(queue.push(&bob, request(200)), 0);
        assert_eq!(queue.push(&alice, request(300)), 1);

        assert_eq!(queue.get(&alice, 1).unwrap().amount, 300);
        assert_eq!(queue.get(&bob, 0).unwrap().amount, 200);
        assert!(queue.get(&bob, 1).is_none());
    }

    #[test]
    fn test_completion_is_terminal_state() {
        let mut queue = UnstakingQueue::new();
        let user = AccountId::new("ST2USER");
        let id = queue.push(&user, request(100));

        queue.get_mut(&user, id).unwrap().completed = true;
        assert!(queue.get(&user, id).unwrap().completed);
        // The record stays addressable; the id is never reused
        assert_eq!(queue.push(&user, request(50)), 1);
    }
}
