//! Collaborators the engine calls into. Implementations are expected to
//! complete synchronously or fail; the engine never retries.

use tripool_core::constants::N_COINS;
use tripool_core::{Address, PoolSnapshot, Result};

/// Three-coin liquidity pool, seen from the strategy's account
pub trait Pool {
  /// Deposit per-slot native amounts; fails if fewer than `min_shares` would be minted
  fn add_liquidity(&mut self, amounts: [u128; N_COINS], min_shares: u128) -> Result<u128>;

  /// Burn `shares` for a single coin; fails if the output is below `min_out`
  fn remove_liquidity_one_coin(&mut self, shares: u128, slot: usize, min_out: u128) -> Result<u128>;

  /// Burn `shares` for every coin in proportion to reserves
  fn remove_liquidity(
    &mut self,
    shares: u128,
    min_amounts: [u128; N_COINS],
  ) -> Result<[u128; N_COINS]>;

  /// Coin amount obtainable by burning `shares` into `slot`
  fn calc_withdraw_one_coin(&self, shares: u128, slot: usize) -> Result<u128>;

  fn virtual_price(&self) -> Result<u128>;

  fn reserve_balance(&self, slot: usize) -> Result<u128>;

  fn coin_at(&self, slot: usize) -> Result<Address>;

  fn share_total_supply(&self) -> Result<u128>;

  /// Pool shares held directly by the strategy (the idle tier)
  fn local_share_balance(&self) -> Result<u128>;

  /// One consistent read of price, reserves and supply
  fn snapshot(&self) -> Result<PoolSnapshot> {
    let virtual_price = self.virtual_price()?;
    let mut reserves = [0u128; N_COINS];
    for (slot, reserve) in reserves.iter_mut().enumerate() {
      *reserve = self.reserve_balance(slot)?;
    }
    let share_supply = self.share_total_supply()?;
    Ok(PoolSnapshot { virtual_price, reserves, share_supply })
  }
}

/// Yield-bearing facility that holds the strategy's idle pool shares
pub trait StakingSink {
  /// Stake every local share; returns the amount moved
  fn deposit_all_local_shares(&mut self) -> Result<u128>;

  /// Stake exactly `amount` local shares
  fn deposit(&mut self, amount: u128) -> Result<()>;

  /// Release `amount` staked shares back to local custody
  fn withdraw(&mut self, amount: u128) -> Result<()>;

  fn staked_balance(&self) -> Result<u128>;
}

impl<S: StakingSink + ?Sized> StakingSink for Box<S> {
  fn deposit_all_local_shares(&mut self) -> Result<u128> {
    (**self).deposit_all_local_shares()
  }

  fn deposit(&mut self, amount: u128) -> Result<()> {
    (**self).deposit(amount)
  }

  fn withdraw(&mut self, amount: u128) -> Result<()> {
    (**self).withdraw(amount)
  }

  fn staked_balance(&self) -> Result<u128> {
    (**self).staked_balance()
  }
}

/// Token movements in and out of the strategy's account
pub trait AssetCustody {
  /// Coin balance held by the strategy
  fn balance_of(&self, asset: &Address) -> Result<u128>;

  /// Move `amount` of `asset` from `owner` into the strategy
  fn pull_from(&mut self, asset: &Address, owner: &Address, amount: u128) -> Result<()>;

  /// Move `amount` of `asset` from the strategy to `recipient`
  fn push_to(&mut self, asset: &Address, recipient: &Address, amount: u128) -> Result<()>;
}
