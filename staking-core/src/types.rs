//! Core types for the staking ledger
//!
//! All types are designed for:
//! - Exact integer arithmetic (u64 micro-units, 6 decimals)
//! - Deterministic state transitions (no clocks, heights come from the host)
//! - Serde serialization for host-side snapshots

use serde::{Deserialize, Serialize};
use std::fmt;

/// Account identifier (user or validator principal)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create new account ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-call context supplied by the host.
///
/// The host resolves and authenticates the caller identity before invoking
/// the core, and provides the current chain height. The core never reads
/// ambient state for either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Authenticated caller identity
    pub acting_as: AccountId,

    /// Current block height
    pub block_height: u64,
}

impl Session {
    /// Create a session for `acting_as` at `block_height`
    pub fn new(acting_as: AccountId, block_height: u64) -> Self {
        Self {
            acting_as,
            block_height,
        }
    }
}

/// Per-validator delegation pool.
///
/// Created on registration, never deleted. Deactivation only flips
/// `active`; existing stakes remain redeemable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorPool {
    /// Whether the pool accepts new stakes
    pub active: bool,

    /// Validator commission on distributed rewards, in basis points (0..=2000)
    pub commission_rate_bps: u64,

    /// Cycle of the most recent reward distribution
    pub last_reward_cycle: u64,

    /// Liquid tokens minted against this pool
    pub liquid_tokens_issued: u64,

    /// Net-of-fee base asset delegated to this pool
    pub total_delegated: u64,

    /// Accrued, unclaimed validator commission
    pub validator_rewards: u64,
}

impl ValidatorPool {
    /// Fresh active pool with all counters zeroed
    pub fn new(commission_rate_bps: u64) -> Self {
        Self {
            active: true,
            commission_rate_bps,
            last_reward_cycle: 0,
            liquid_tokens_issued: 0,
            total_delegated: 0,
            validator_rewards: 0,
        }
    }
}

/// Per-(user, validator) stake record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStake {
    /// Net principal after protocol fee
    pub stx_amount: u64,

    /// Liquid tokens minted against this stake
    pub liquid_tokens: u64,

    /// Height of the most recent stake (overwritten on top-up)
    pub stake_height: u64,

    /// Height of the most recent unstaking initiation, if any
    pub unstaking_height: Option<u64>,

    /// Cumulative rewards claimed through compounding
    pub rewards_claimed: u64,
}

/// Per-user liquid token account.
///
/// Unseen users implicitly hold the zero account; no explicit row is
/// required before the first credit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidTokenAccount {
    /// Spendable liquid token balance
    pub balance: u64,

    /// Cycle of the most recent compounding claim
    pub last_claim_cycle: u64,
}

/// A pending redemption of liquid tokens for the base asset.
///
/// Tokens are burned up front at initiation; the base asset is released at
/// completion, after the unstaking period. `validator` and `stx_principal`
/// are recorded at initiation so completion can unwind the pool delegation
/// without re-deriving it from mutated stake state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnstakingRequest {
    /// Base-asset value owed, fixed at initiation
    pub amount: u64,

    /// Liquid tokens burned
    pub liquid_tokens: u64,

    /// Height at which the request was initiated
    pub initiated_height: u64,

    /// Whether the request has been completed (terminal, never reset)
    pub completed: bool,

    /// Pool the burned tokens were issued against
    pub validator: AccountId,

    /// Net principal share removed from the stake at initiation
    pub stx_principal: u64,
}

/// Protocol-wide aggregates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolStats {
    /// Total base-asset backing (net principal plus distributed rewards)
    pub total_staked: u64,

    /// Total liquid token supply
    pub total_liquid_tokens: u64,

    /// Fixed-point exchange rate, scale 1_000_000 = 1.0
    pub exchange_rate: u64,

    /// Accumulated protocol fees
    pub protocol_fees: u64,

    /// Administrator-advanced epoch counter
    pub current_cycle: u64,
}

impl Default for ProtocolStats {
    fn default() -> Self {
        Self {
            total_staked: 0,
            total_liquid_tokens: 0,
            exchange_rate: crate::rates::RATE_SCALE,
            protocol_fees: 0,
            current_cycle: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_display() {
        let account = AccountId::new("ST1VALIDATOR");
        assert_eq!(account.as_str(), "ST1VALIDATOR");
        assert_eq!(account.to_string(), "ST1VALIDATOR");
    }

    #[test]
    fn test_new_pool_is_zeroed_and_active() {
        let pool = ValidatorPool::new(1000);
        assert!(pool.active);
        assert_eq!(pool.commission_rate_bps, 1000);
        assert_eq!(pool.last_reward_cycle, 0);
        assert_eq!(pool.liquid_tokens_issued, 0);
        assert_eq!(pool.total_delegated, 0);
        assert_eq!(pool.validator_rewards, 0);
    }

    #[test]
    fn test_default_account_is_zero() {
        let account = LiquidTokenAccount::default();
        assert_eq!(account.balance, 0);
        assert_eq!(account.last_claim_cycle, 0);
    }

    #[test]
    fn test_default_stats_identity_rate() {
        let stats = ProtocolStats::default();
        assert_eq!(stats.exchange_rate, 1_000_000);
        assert_eq!(stats.total_staked, 0);
        assert_eq!(stats.total_liquid_tokens, 0);
    }

    #[test]
    fn test_stats_snapshot_for_host() {
        // Hosts serialize stats for their query surface
        let stats = ProtocolStats::default();
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["exchange_rate"], 1_000_000);

        let back: ProtocolStats = serde_json::from_value(json).unwrap();
        assert_eq!(back, stats);
    }
}
