//! Pending-reward and yield calculations
//!
//! Rewards are not tracked per user; they are implied by the spread
//! between the redeemable value of a stake's liquid tokens and its net
//! principal. Distribution lifts the exchange rate, which widens the
//! spread for every holder proportionally.

use staking_core::{rates, AccountId, StakingLedger};

/// Redeemable value of the user's liquid holdings at `validator` minus the
/// original net principal.
///
/// Non-negative by construction: the model has no rate decreases (no
/// slashing), and the saturation only absorbs floor rounding.
pub fn pending_rewards(ledger: &StakingLedger, user: &AccountId, validator: &AccountId) -> u64 {
    match ledger.user_stake(user, validator) {
        Some(stake) if stake.liquid_tokens > 0 => ledger
            .calculate_stx_value(stake.liquid_tokens)
            .saturating_sub(stake.stx_amount),
        _ => 0,
    }
}

/// Pending reward as parts-per-10,000 of the original net principal
pub fn user_yield_bps(ledger: &StakingLedger, user: &AccountId, validator: &AccountId) -> u64 {
    let Some(stake) = ledger.user_stake(user, validator) else {
        return 0;
    };
    if stake.stx_amount == 0 {
        return 0;
    }
    let pending = pending_rewards(ledger, user, validator);
    ((pending as u128) * (rates::BPS_SCALE as u128) / (stake.stx_amount as u128)) as u64
}
