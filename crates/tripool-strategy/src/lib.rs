//! Strategy engine: moves vault capital into a three-coin pool and back,
//! keeping idle pool shares staked.
//!
//! - [`interfaces`]: collaborator traits (pool, staking sink, asset custody)
//! - [`ledger`]: local/staked share reconciliation
//! - [`strategy`]: the public deposit / withdraw / balance operations
//! - [`staking`]: staking backends that live in this crate
//! - `memory` (feature `memory`): in-memory collaborators for simulation and tests

pub mod events;
pub mod interfaces;
pub mod ledger;
#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod staking;
pub mod strategy;

pub use interfaces::{AssetCustody, Pool, StakingSink};
pub use ledger::ShareLedger;
pub use staking::NoStaking;
pub use strategy::{Strategy, StrategySettings};
