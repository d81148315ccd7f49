//! Yield engine: reward distribution, compounding, and farming
//!
//! The engine owns the [`StakingLedger`] and layers reward policy on top of
//! it: which caller may distribute, how commission is split, when a user may
//! compound, and how farming locks are gated. The balanced state mutations
//! themselves are applied through the ledger's entry points so conservation
//! is enforced in one place.

use crate::{
    config::Config,
    farming::{FarmPosition, FarmRegistry},
    rewards,
};
use staking_core::{rates, AccountId, Error, Result, Session, StakingLedger};

/// Reward and farming layer over the staking ledger
#[derive(Debug, Clone)]
pub struct YieldEngine {
    ledger: StakingLedger,
    farms: FarmRegistry,
    config: Config,
}

impl YieldEngine {
    /// Wrap an existing ledger
    pub fn new(ledger: StakingLedger, config: Config) -> Self {
        Self {
            ledger,
            farms: FarmRegistry::new(),
            config,
        }
    }

    // ------------------------------------------------------------------
    // Reward distribution
    // ------------------------------------------------------------------

    /// Distribute `reward_amount` of base asset to the caller's own pool.
    ///
    /// Only a registered validator may distribute, and only into the pool
    /// it operates. Commission is carved off at the pool's rate and accrues
    /// to the validator; the remainder raises the backing value, lifting
    /// the exchange rate for every liquid token holder.
    pub fn distribute_rewards(&mut self, session: &Session, reward_amount: u64) -> Result<()> {
        self.ensure_not_paused()?;
        if reward_amount == 0 {
            return Err(Error::InvalidAmount("distribution of zero".to_string()));
        }

        let pool = self
            .ledger
            .pool(&session.acting_as)
            .ok_or(Error::InvalidValidator)?;
        let commission = rates::bps_share(reward_amount, pool.commission_rate_bps);
        let pool_reward = reward_amount - commission;

        self.ledger
            .apply_reward_distribution(&session.acting_as, commission, pool_reward)
    }

    /// Pay out the caller's accrued validator commission.
    ///
    /// Returns the base-asset amount the host must transfer to the caller.
    pub fn claim_validator_rewards(&mut self, session: &Session) -> Result<u64> {
        self.ensure_not_paused()?;
        self.ledger.take_validator_rewards(&session.acting_as)
    }

    // ------------------------------------------------------------------
    // Pending rewards and compounding
    // ------------------------------------------------------------------

    /// Pending rewards for `user`'s stake with `validator`
    pub fn pending_rewards(&self, user: &AccountId, validator: &AccountId) -> u64 {
        rewards::pending_rewards(&self.ledger, user, validator)
    }

    /// Pending reward as parts-per-10,000 of the net principal
    pub fn user_yield_bps(&self, user: &AccountId, validator: &AccountId) -> u64 {
        rewards::user_yield_bps(&self.ledger, user, validator)
    }

    /// Compound the caller's pending rewards into their stake.
    ///
    /// The pending spread is folded into the principal and fresh liquid
    /// tokens are minted against it at the current exchange rate. Gated to
    /// at most one claim per configured cycle span. Returns the liquid
    /// tokens minted.
    ///
    /// The minted tokens are not matched by new base asset, so the next
    /// rate recomputation prices the dilution in.
    pub fn auto_compound(&mut self, session: &Session, validator: &AccountId) -> Result<u64> {
        self.ensure_not_paused()?;
        if self
            .ledger
            .user_stake(&session.acting_as, validator)
            .is_none()
        {
            return Err(Error::NotAuthorized);
        }

        let current_cycle = self.ledger.protocol_stats().current_cycle;
        let last_claim = self.ledger.liquid_balance(&session.acting_as).last_claim_cycle;
        if current_cycle.saturating_sub(last_claim) < self.config.min_cycles_between_compounds {
            return Err(Error::InvalidAmount(format!(
                "compounded in cycle {}, next claim at cycle {}",
                last_claim,
                last_claim + self.config.min_cycles_between_compounds
            )));
        }

        let pending = self.pending_rewards(&session.acting_as, validator);
        if pending == 0 {
            return Err(Error::InvalidAmount("no pending rewards".to_string()));
        }
        let minted = self.ledger.calculate_liquid_tokens(pending);

        self.ledger
            .mint_compounded(&session.acting_as, validator, pending, minted)?;
        tracing::info!(
            user = %session.acting_as,
            validator = %validator,
            pending,
            minted,
            "auto-compound applied"
        );
        Ok(minted)
    }

    // ------------------------------------------------------------------
    // Farming
    // ------------------------------------------------------------------

    /// Lock `amount` liquid tokens for `period_blocks`. Returns the new
    /// position id.
    pub fn deposit_for_yield(
        &mut self,
        session: &Session,
        amount: u64,
        period_blocks: u64,
    ) -> Result<u64> {
        self.ensure_not_paused()?;
        if amount == 0 {
            return Err(Error::InvalidAmount("deposit of zero".to_string()));
        }
        if period_blocks < self.config.min_lock_period_blocks {
            return Err(Error::InvalidAmount(format!(
                "lock of {} blocks below minimum {}",
                period_blocks, self.config.min_lock_period_blocks
            )));
        }

        self.ledger.lock_liquid(&session.acting_as, amount)?;
        let id = self.farms.push(
            &session.acting_as,
            FarmPosition {
                amount,
                start_height: session.block_height,
                period_blocks,
                withdrawn: false,
            },
        );

        tracing::info!(
            user = %session.acting_as,
            amount,
            period_blocks,
            position_id = id,
            "farming deposit locked"
        );
        Ok(id)
    }

    /// Withdraw a matured farming position, releasing the locked tokens.
    ///
    /// Replaying a withdrawn position is rejected with `NotAuthorized`, the
    /// same signal as a lookup miss. Returns the liquid amount released.
    pub fn withdraw_yield_deposit(&mut self, session: &Session, position_id: u64) -> Result<u64> {
        self.ensure_not_paused()?;

        let position = self
            .farms
            .get(&session.acting_as, position_id)
            .ok_or(Error::NotAuthorized)?;
        if position.withdrawn {
            return Err(Error::NotAuthorized);
        }
        if session.block_height < position.unlock_height() {
            return Err(Error::UnstakingPeriod {
                remaining: position.unlock_height() - session.block_height,
            });
        }

        let amount = position.amount;
        self.ledger.release_liquid(&session.acting_as, amount)?;
        self.farms
            .get_mut(&session.acting_as, position_id)
            .expect("position checked above")
            .withdrawn = true;

        tracing::info!(
            user = %session.acting_as,
            position_id,
            amount,
            "farming deposit withdrawn"
        );
        Ok(amount)
    }

    /// Farming position lookup
    pub fn farm_position(&self, user: &AccountId, id: u64) -> Option<&FarmPosition> {
        self.farms.get(user, id)
    }

    // ------------------------------------------------------------------
    // Ledger access
    // ------------------------------------------------------------------

    /// Read access to the underlying ledger
    pub fn ledger(&self) -> &StakingLedger {
        &self.ledger
    }

    /// Mutable access for staking, unstaking, and admin calls
    pub fn ledger_mut(&mut self) -> &mut StakingLedger {
        &mut self.ledger
    }

    fn ensure_not_paused(&self) -> Result<()> {
        if self.ledger.is_paused() {
            return Err(Error::Paused);
        }
        Ok(())
    }
}
