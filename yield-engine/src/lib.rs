//! Yield engine for the liquid staking protocol
//!
//! Layers reward policy over [`staking_core`]: validator-driven reward
//! distribution with per-pool commission splits, pending-reward queries
//! derived from the exchange-rate spread, cycle-gated auto-compounding,
//! and time-locked farming of liquid tokens.
//!
//! The engine owns the [`StakingLedger`] and exposes it through
//! [`YieldEngine::ledger`] / [`YieldEngine::ledger_mut`] so hosts drive
//! staking and admin calls through the same instance the reward layer
//! observes.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod config;
pub mod engine;
pub mod farming;
pub mod rewards;

pub use config::Config;
pub use engine::YieldEngine;
pub use farming::{FarmPosition, FarmRegistry};
pub use staking_core::{Error, Result, StakingLedger};
