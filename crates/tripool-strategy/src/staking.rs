//! Staking backends provided by this crate

use tripool_core::{Result, StrategyError};

use crate::interfaces::StakingSink;

/// Backend for deployments without a reward sink: every share stays local
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStaking;

impl StakingSink for NoStaking {
  fn deposit_all_local_shares(&mut self) -> Result<u128> {
    Ok(0)
  }

  fn deposit(&mut self, amount: u128) -> Result<()> {
    if amount == 0 {
      return Ok(());
    }
    Err(StrategyError::Staking(format!(
      "cannot stake {amount} shares: no staking backend configured"
    )))
  }

  fn withdraw(&mut self, amount: u128) -> Result<()> {
    if amount == 0 {
      return Ok(());
    }
    Err(StrategyError::Staking(format!(
      "cannot release {amount} shares: no staking backend configured"
    )))
  }

  fn staked_balance(&self) -> Result<u128> {
    Ok(0)
  }
}
