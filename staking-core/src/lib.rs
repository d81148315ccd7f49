//! Stratum Staking Core
//!
//! Accounting core of a liquid-staking protocol: users delegate the base
//! asset to validator pools, receive fungible liquid claim tokens at the
//! current exchange rate, and redeem them through a delayed unstaking
//! queue.
//!
//! # Architecture
//!
//! - **Explicit context**: all state lives in [`StakingLedger`], owned by
//!   the host session; callers are identified by a [`Session`] resolved
//!   and authenticated by the host
//! - **Atomic transitions**: every operation validates before mutating, so
//!   failures leave state untouched
//! - **Serialized calls**: the host invokes one operation at a time; the
//!   core performs no I/O, blocking, or suspension
//!
//! # Invariants
//!
//! - Conservation: liquid supply == Σ account balances + locked farming
//!   amounts == Σ per-pool issuance, after every operation
//! - Identity rate: the exchange rate is 1.0 while no liquid tokens exist
//! - Request ids: per-user, sequential from zero, never reused

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod config;
pub mod error;
pub mod ledger;
pub mod rates;
pub mod registry;
pub mod types;
pub mod unstaking;

// Re-exports
pub use config::Config;
pub use error::{Error, Result};
pub use ledger::StakingLedger;
pub use types::{
    AccountId, LiquidTokenAccount, ProtocolStats, Session, UnstakingRequest, UserStake,
    ValidatorPool,
};
