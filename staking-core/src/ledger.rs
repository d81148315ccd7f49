//! Main staking ledger
//!
//! This module ties the pool registry, exchange-rate oracle, and unstaking
//! queue into the atomic operation surface the host invokes. The ledger is
//! the explicit session context object: the host owns one per protocol
//! instance, serializes calls to it, and threads the authenticated caller
//! identity through a [`Session`] on every mutating operation.
//!
//! Every operation validates all preconditions before touching any state,
//! so a failed call leaves the ledger exactly as it found it.
//!
//! # Example
//!
//! ```
//! use staking_core::{AccountId, Config, Session, StakingLedger};
//!
//! let owner = AccountId::new("ST1OWNER");
//! let mut ledger = StakingLedger::new(owner, Config::default());
//!
//! let validator = AccountId::new("ST1VALIDATOR");
//! ledger
//!     .register_validator(&Session::new(validator.clone(), 100), 1000)
//!     .unwrap();
//!
//! let staker = Session::new(AccountId::new("ST2USER"), 101);
//! let minted = ledger.stake(&staker, &validator, 1_000_000).unwrap();
//! assert_eq!(minted, 1_000_000);
//! ```

use crate::{
    rates,
    registry::ValidatorRegistry,
    types::{
        AccountId, LiquidTokenAccount, ProtocolStats, Session, UnstakingRequest, UserStake,
        ValidatorPool,
    },
    unstaking::UnstakingQueue,
    Config, Error, Result,
};
use std::collections::HashMap;

/// The staking ledger: all mutable protocol state behind one context object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakingLedger {
    /// Configuration
    config: Config,

    /// Protocol owner (admin surface)
    owner: AccountId,

    /// Global pause flag; mutating operations reject while set
    paused: bool,

    /// Per-validator delegation pools
    registry: ValidatorRegistry,

    /// Per-(user, validator) stake records
    stakes: HashMap<(AccountId, AccountId), UserStake>,

    /// Per-user liquid token accounts
    accounts: HashMap<AccountId, LiquidTokenAccount>,

    /// Per-user unstaking request sequences
    unstaking: UnstakingQueue,

    /// Protocol-wide aggregates
    stats: ProtocolStats,

    /// Base asset held on the protocol's behalf, mirroring the host's
    /// atomic transfers in and out
    reserve: u64,

    /// Liquid tokens locked in farming positions (tracked for conservation)
    locked_liquid: u64,
}

impl StakingLedger {
    /// Fresh ledger owned by `owner`
    pub fn new(owner: AccountId, config: Config) -> Self {
        Self {
            config,
            owner,
            paused: false,
            registry: ValidatorRegistry::new(),
            stakes: HashMap::new(),
            accounts: HashMap::new(),
            unstaking: UnstakingQueue::new(),
            stats: ProtocolStats::default(),
            reserve: 0,
            locked_liquid: 0,
        }
    }

    // ------------------------------------------------------------------
    // Validator pool registry
    // ------------------------------------------------------------------

    /// Register the caller as a validator with the given commission
    pub fn register_validator(&mut self, session: &Session, commission_rate_bps: u64) -> Result<()> {
        self.ensure_not_paused()?;
        self.registry.register(
            session.acting_as.clone(),
            commission_rate_bps,
            self.config.max_commission_bps,
        )?;
        tracing::info!(
            validator = %session.acting_as,
            commission_rate_bps,
            "validator registered"
        );
        Ok(())
    }

    /// Update the commission rate of the caller's pool
    pub fn update_validator_commission(&mut self, session: &Session, new_rate_bps: u64) -> Result<()> {
        self.ensure_not_paused()?;
        self.registry.update_commission(
            &session.acting_as,
            new_rate_bps,
            self.config.max_commission_bps,
        )?;
        tracing::info!(validator = %session.acting_as, new_rate_bps, "commission updated");
        Ok(())
    }

    /// Deactivate the caller's pool; no new stakes accepted afterwards
    pub fn deactivate_validator(&mut self, session: &Session) -> Result<()> {
        self.ensure_not_paused()?;
        self.registry.deactivate(&session.acting_as)?;
        tracing::info!(validator = %session.acting_as, "validator deactivated");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Staking
    // ------------------------------------------------------------------

    /// Stake `amount` of base asset with `validator`.
    ///
    /// A flat protocol fee is carved off the principal; liquid tokens are
    /// minted against the gross amount at the current exchange rate.
    /// Returns the liquid tokens minted.
    pub fn stake(&mut self, session: &Session, validator: &AccountId, amount: u64) -> Result<u64> {
        self.ensure_not_paused()?;
        if amount < self.config.min_stake {
            return Err(Error::InvalidAmount(format!(
                "stake of {} below minimum {}",
                amount, self.config.min_stake
            )));
        }

        let rate = self.stats.exchange_rate;
        let fee = rates::bps_share(amount, self.config.protocol_fee_bps);
        let net_amount = amount - fee;
        let minted = rates::stx_to_liquid(amount, rate);

        let pool = self.registry.get_active_mut(validator)?;
        pool.total_delegated = add(pool.total_delegated, net_amount);
        pool.liquid_tokens_issued = add(pool.liquid_tokens_issued, minted);

        let stake = self
            .stakes
            .entry((session.acting_as.clone(), validator.clone()))
            .or_default();
        stake.stx_amount = add(stake.stx_amount, net_amount);
        stake.liquid_tokens = add(stake.liquid_tokens, minted);
        stake.stake_height = session.block_height;

        let account = self.accounts.entry(session.acting_as.clone()).or_default();
        account.balance = add(account.balance, minted);

        self.stats.total_staked = add(self.stats.total_staked, net_amount);
        self.stats.total_liquid_tokens = add(self.stats.total_liquid_tokens, minted);
        self.stats.protocol_fees = add(self.stats.protocol_fees, fee);
        self.reserve = add(self.reserve, amount);

        tracing::info!(
            user = %session.acting_as,
            validator = %validator,
            amount,
            net_amount,
            minted,
            rate,
            "stake accepted"
        );
        Ok(minted)
    }

    /// Move liquid tokens between accounts.
    ///
    /// Pure balance move; pool totals and the exchange rate are unaffected.
    pub fn transfer_liquid(&mut self, session: &Session, to: &AccountId, amount: u64) -> Result<()> {
        self.ensure_not_paused()?;
        if amount == 0 {
            return Err(Error::InvalidAmount("transfer of zero".to_string()));
        }
        if *to == session.acting_as {
            return Err(Error::InvalidAmount("transfer to self".to_string()));
        }

        let from_balance = self.liquid_balance(&session.acting_as).balance;
        if from_balance < amount {
            return Err(Error::InsufficientBalance {
                available: from_balance,
                required: amount,
            });
        }

        self.accounts
            .get_mut(&session.acting_as)
            .expect("funded account must exist")
            .balance -= amount;
        let to_account = self.accounts.entry(to.clone()).or_default();
        to_account.balance = add(to_account.balance, amount);

        tracing::debug!(from = %session.acting_as, to = %to, amount, "liquid transfer");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Unstaking
    // ------------------------------------------------------------------

    /// Initiate redemption of `liquid_amount` tokens staked with `validator`.
    ///
    /// Tokens are burned up front; the base-asset value owed is fixed at
    /// the current exchange rate and released by [`complete_unstaking`]
    /// after the unstaking period. Returns the new request id.
    ///
    /// [`complete_unstaking`]: StakingLedger::complete_unstaking
    pub fn initiate_unstaking(
        &mut self,
        session: &Session,
        validator: &AccountId,
        liquid_amount: u64,
    ) -> Result<u64> {
        self.ensure_not_paused()?;
        if liquid_amount == 0 {
            return Err(Error::InvalidAmount("unstake of zero".to_string()));
        }

        let balance = self.liquid_balance(&session.acting_as).balance;
        if balance < liquid_amount {
            return Err(Error::InsufficientBalance {
                available: balance,
                required: liquid_amount,
            });
        }

        let key = (session.acting_as.clone(), validator.clone());
        let stake = self.stakes.get(&key).ok_or(Error::NotAuthorized)?;
        if liquid_amount > stake.liquid_tokens {
            return Err(Error::InvalidAmount(format!(
                "unstake of {} exceeds {} staked with validator",
                liquid_amount, stake.liquid_tokens
            )));
        }

        let stx_owed = rates::liquid_to_stx(liquid_amount, self.stats.exchange_rate);
        // Proportional principal share, floored; fixed before any mutation
        let stx_principal = ((stake.stx_amount as u128) * (liquid_amount as u128)
            / (stake.liquid_tokens as u128)) as u64;

        let stake = self.stakes.get_mut(&key).expect("stake checked above");
        stake.liquid_tokens -= liquid_amount;
        stake.stx_amount -= stx_principal;
        stake.unstaking_height = Some(session.block_height);

        self.accounts
            .get_mut(&session.acting_as)
            .expect("funded account must exist")
            .balance -= liquid_amount;

        let pool = self
            .registry
            .get_mut(validator)
            .expect("pool must exist for an open stake");
        pool.liquid_tokens_issued = sub(pool.liquid_tokens_issued, liquid_amount);
        self.stats.total_liquid_tokens = sub(self.stats.total_liquid_tokens, liquid_amount);

        let id = self.unstaking.push(
            &session.acting_as,
            UnstakingRequest {
                amount: stx_owed,
                liquid_tokens: liquid_amount,
                initiated_height: session.block_height,
                completed: false,
                validator: validator.clone(),
                stx_principal,
            },
        );

        tracing::info!(
            user = %session.acting_as,
            validator = %validator,
            liquid_amount,
            stx_owed,
            request_id = id,
            "unstaking initiated"
        );
        Ok(id)
    }

    /// Complete a matured unstaking request, releasing the base asset.
    ///
    /// Replaying a completed request is rejected with `NotAuthorized`, the
    /// same signal as a lookup miss. Returns the base-asset amount the host
    /// must transfer to the caller.
    pub fn complete_unstaking(&mut self, session: &Session, request_id: u64) -> Result<u64> {
        self.ensure_not_paused()?;

        let request = self
            .unstaking
            .get(&session.acting_as, request_id)
            .ok_or(Error::NotAuthorized)?;
        if request.completed {
            return Err(Error::NotAuthorized);
        }

        let elapsed = session.block_height.saturating_sub(request.initiated_height);
        if elapsed < self.config.unstaking_period_blocks {
            return Err(Error::UnstakingPeriod {
                remaining: self.config.unstaking_period_blocks - elapsed,
            });
        }
        if self.reserve < request.amount {
            return Err(Error::InsufficientBalance {
                available: self.reserve,
                required: request.amount,
            });
        }

        let amount = request.amount;
        let stx_principal = request.stx_principal;
        let validator = request.validator.clone();

        self.reserve -= amount;
        let pool = self
            .registry
            .get_mut(&validator)
            .expect("pool must exist for a recorded request");
        pool.total_delegated = sub(pool.total_delegated, stx_principal);

        // The owed amount can exceed recorded backing by the fee share of
        // gross-minted tokens when no rewards were ever distributed; the
        // shortfall comes out of collected fees held in the reserve.
        if amount > self.stats.total_staked {
            tracing::warn!(
                amount,
                total_staked = self.stats.total_staked,
                "redemption exceeds recorded backing"
            );
            self.stats.total_staked = 0;
        } else {
            self.stats.total_staked -= amount;
        }

        self.unstaking
            .get_mut(&session.acting_as, request_id)
            .expect("request checked above")
            .completed = true;

        tracing::info!(
            user = %session.acting_as,
            request_id,
            amount,
            "unstaking completed"
        );
        Ok(amount)
    }

    // ------------------------------------------------------------------
    // Admin surface
    // ------------------------------------------------------------------

    /// Advance the protocol cycle counter (owner only)
    pub fn update_current_cycle(&mut self, session: &Session, new_cycle: u64) -> Result<()> {
        self.ensure_owner(session)?;
        self.ensure_not_paused()?;
        self.stats.current_cycle = new_cycle;
        tracing::info!(new_cycle, "cycle updated");
        Ok(())
    }

    /// Flip the global pause flag (owner only). Returns the new state.
    pub fn toggle_pause(&mut self, session: &Session) -> Result<bool> {
        self.ensure_owner(session)?;
        self.paused = !self.paused;
        tracing::info!(paused = self.paused, "pause toggled");
        Ok(self.paused)
    }

    // ------------------------------------------------------------------
    // Read-only surface
    // ------------------------------------------------------------------

    /// Pool lookup
    pub fn pool(&self, validator: &AccountId) -> Option<&ValidatorPool> {
        self.registry.get(validator)
    }

    /// Stake record lookup
    pub fn user_stake(&self, user: &AccountId, validator: &AccountId) -> Option<&UserStake> {
        self.stakes.get(&(user.clone(), validator.clone()))
    }

    /// Liquid account for `user`; unseen users hold the zero account
    pub fn liquid_balance(&self, user: &AccountId) -> LiquidTokenAccount {
        self.accounts.get(user).cloned().unwrap_or_default()
    }

    /// Unstaking request lookup
    pub fn unstaking_request(&self, user: &AccountId, id: u64) -> Option<&UnstakingRequest> {
        self.unstaking.get(user, id)
    }

    /// Protocol-wide aggregates
    pub fn protocol_stats(&self) -> &ProtocolStats {
        &self.stats
    }

    /// Base asset held on the protocol's behalf
    pub fn reserve(&self) -> u64 {
        self.reserve
    }

    /// Whether mutating operations are currently rejected
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Protocol owner identity
    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Liquid tokens minted for `stx_amount` at the current rate
    pub fn calculate_liquid_tokens(&self, stx_amount: u64) -> u64 {
        rates::stx_to_liquid(stx_amount, self.stats.exchange_rate)
    }

    /// Base-asset value of `liquid_amount` at the current rate
    pub fn calculate_stx_value(&self, liquid_amount: u64) -> u64 {
        rates::liquid_to_stx(liquid_amount, self.stats.exchange_rate)
    }

    /// Check the liquid-token conservation invariant.
    ///
    /// The total supply must equal both the sum of account balances plus
    /// locked farming amounts and the sum of per-pool issuance.
    pub fn check_conservation(&self) -> bool {
        let account_sum: u64 = self
            .accounts
            .values()
            .fold(0u64, |acc, a| add(acc, a.balance));
        let pool_sum: u64 = self
            .registry
            .iter()
            .fold(0u64, |acc, (_, p)| add(acc, p.liquid_tokens_issued));

        add(account_sum, self.locked_liquid) == self.stats.total_liquid_tokens
            && pool_sum == self.stats.total_liquid_tokens
    }

    // ------------------------------------------------------------------
    // Reward-engine entry points
    //
    // Authorization and amount validation live in the yield engine; these
    // apply the balanced mutation atomically so protocol invariants are
    // enforced in one place.
    // ------------------------------------------------------------------

    /// Apply a reward distribution to `validator`'s pool.
    ///
    /// Commission accrues unclaimed; the pool reward raises the backing
    /// value without minting, which lifts the exchange rate. The only
    /// operation that recomputes the stored rate.
    pub fn apply_reward_distribution(
        &mut self,
        validator: &AccountId,
        commission: u64,
        pool_reward: u64,
    ) -> Result<()> {
        self.ensure_not_paused()?;
        let current_cycle = self.stats.current_cycle;
        let pool = self.registry.get_mut(validator).ok_or(Error::InvalidValidator)?;

        pool.validator_rewards = add(pool.validator_rewards, commission);
        pool.last_reward_cycle = current_cycle;
        self.stats.total_staked = add(self.stats.total_staked, pool_reward);
        self.reserve = add(self.reserve, add(commission, pool_reward));
        self.stats.exchange_rate =
            rates::recompute(self.stats.total_staked, self.stats.total_liquid_tokens);

        tracing::info!(
            validator = %validator,
            commission,
            pool_reward,
            exchange_rate = self.stats.exchange_rate,
            "rewards distributed"
        );
        Ok(())
    }

    /// Pay out `validator`'s accrued commission from the reserve
    pub fn take_validator_rewards(&mut self, validator: &AccountId) -> Result<u64> {
        self.ensure_not_paused()?;
        let pool = self.registry.get_mut(validator).ok_or(Error::InvalidValidator)?;
        let rewards = pool.validator_rewards;
        if rewards == 0 {
            return Err(Error::InvalidAmount("no accrued rewards".to_string()));
        }
        if self.reserve < rewards {
            return Err(Error::InsufficientBalance {
                available: self.reserve,
                required: rewards,
            });
        }

        pool.validator_rewards = 0;
        self.reserve -= rewards;
        tracing::info!(validator = %validator, rewards, "validator rewards claimed");
        Ok(rewards)
    }

    /// Mint `minted` liquid tokens against `user`'s stake, compounding
    /// `pending` base-asset rewards into the principal
    pub fn mint_compounded(
        &mut self,
        user: &AccountId,
        validator: &AccountId,
        pending: u64,
        minted: u64,
    ) -> Result<()> {
        self.ensure_not_paused()?;
        let current_cycle = self.stats.current_cycle;
        let stake = self
            .stakes
            .get_mut(&(user.clone(), validator.clone()))
            .ok_or(Error::NotAuthorized)?;

        stake.stx_amount = add(stake.stx_amount, pending);
        stake.liquid_tokens = add(stake.liquid_tokens, minted);
        stake.rewards_claimed = add(stake.rewards_claimed, pending);

        let pool = self
            .registry
            .get_mut(validator)
            .expect("pool must exist for an open stake");
        pool.liquid_tokens_issued = add(pool.liquid_tokens_issued, minted);
        pool.total_delegated = add(pool.total_delegated, pending);

        let account = self.accounts.entry(user.clone()).or_default();
        account.balance = add(account.balance, minted);
        account.last_claim_cycle = current_cycle;

        self.stats.total_liquid_tokens = add(self.stats.total_liquid_tokens, minted);

        tracing::info!(user = %user, validator = %validator, pending, minted, "rewards compounded");
        Ok(())
    }

    /// Move `amount` from `user`'s balance into the farming lock
    pub fn lock_liquid(&mut self, user: &AccountId, amount: u64) -> Result<()> {
        self.ensure_not_paused()?;
        let balance = self.liquid_balance(user).balance;
        if balance < amount {
            return Err(Error::InsufficientBalance {
                available: balance,
                required: amount,
            });
        }
        self.accounts
            .get_mut(user)
            .expect("funded account must exist")
            .balance -= amount;
        self.locked_liquid = add(self.locked_liquid, amount);
        Ok(())
    }

    /// Release `amount` from the farming lock back to `user`'s balance
    pub fn release_liquid(&mut self, user: &AccountId, amount: u64) -> Result<()> {
        self.ensure_not_paused()?;
        self.locked_liquid = sub(self.locked_liquid, amount);
        let account = self.accounts.entry(user.clone()).or_default();
        account.balance = add(account.balance, amount);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Guards
    // ------------------------------------------------------------------

    fn ensure_not_paused(&self) -> Result<()> {
        if self.paused {
            return Err(Error::Paused);
        }
        Ok(())
    }

    fn ensure_owner(&self, session: &Session) -> Result<()> {
        if session.acting_as != self.owner {
            return Err(Error::OwnerOnly);
        }
        Ok(())
    }
}

/// Checked aggregate addition; overflow means a corrupted ledger
fn add(a: u64, b: u64) -> u64 {
    a.checked_add(b).expect("ledger aggregate overflow")
}

/// Checked aggregate subtraction; underflow means a corrupted ledger
fn sub(a: u64, b: u64) -> u64 {
    a.checked_sub(b).expect("ledger aggregate underflow")
}
