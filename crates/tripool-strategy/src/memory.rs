//! In-memory collaborators used by the simulator and the test suites.
//!
//! A [`MemoryBook`] is a shared token ledger; [`MemoryPool`], [`MemoryGauge`]
//! and [`MemoryCustody`] all move balances in the same book, so share tokens
//! minted by the pool are the ones the gauge stakes. Every coin is valued at
//! par; there is no swap curve, only the accounting surface the strategy sees.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tripool_core::constants::{BPS_PRECISION, N_COINS, PRECISION};
use tripool_core::decimals::{from_canonical, to_canonical};
use tripool_core::math::{mul_div_down, scale_down};
use tripool_core::{Address, Result, StrategyError, SupportedAsset};

use crate::interfaces::{AssetCustody, Pool, StakingSink};

pub const POOL_ADDRESS: Address = Address([0xb0; 20]);
pub const SHARE_TOKEN: Address = Address([0xb1; 20]);
pub const GAUGE_ADDRESS: Address = Address([0xb2; 20]);

/// Token balances keyed by (token, holder)
#[derive(Debug, Clone, Default)]
pub struct MemoryBook {
  balances: Rc<RefCell<HashMap<(Address, Address), u128>>>,
}

impl MemoryBook {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn balance(&self, token: &Address, holder: &Address) -> u128 {
    self.balances.borrow().get(&(*token, *holder)).copied().unwrap_or(0)
  }

  pub fn mint(&self, token: &Address, holder: &Address, amount: u128) {
    let mut balances = self.balances.borrow_mut();
    let entry = balances.entry((*token, *holder)).or_insert(0);
    *entry = entry.saturating_add(amount);
  }

  pub fn burn(&self, token: &Address, holder: &Address, amount: u128) -> std::result::Result<(), String> {
    let mut balances = self.balances.borrow_mut();
    let current = balances.get(&(*token, *holder)).copied().unwrap_or(0);
    let next = current
      .checked_sub(amount)
      .ok_or_else(|| format!("{holder} holds {current} of {token}, cannot burn {amount}"))?;
    balances.insert((*token, *holder), next);
    Ok(())
  }

  pub fn transfer(
    &self,
    token: &Address,
    from: &Address,
    to: &Address,
    amount: u128,
  ) -> std::result::Result<(), String> {
    if amount == 0 {
      return Ok(());
    }
    self.burn(token, from, amount)?;
    self.mint(token, to, amount);
    Ok(())
  }
}

/// Par-valued three-coin pool with a flat fee on mints and single-coin exits
#[derive(Debug, Clone)]
pub struct MemoryPool {
  book: MemoryBook,
  /// Indexed by slot
  coins: [SupportedAsset; N_COINS],
  holder: Address,
  share_supply: u128,
  fee_bps: u64,
}

impl MemoryPool {
  /// # Arguments
  /// * `book` - Shared token ledger
  /// * `coins` - The pool's coins; any order, slots must be 0..3
  /// * `holder` - Account whose shares count as the strategy's local tier
  pub fn new(book: MemoryBook, coins: [SupportedAsset; N_COINS], holder: Address) -> Self {
    let mut coins = coins;
    coins.sort_by_key(|c| c.slot);
    Self { book, coins, holder, share_supply: 0, fee_bps: 0 }
  }

  pub fn with_fee_bps(mut self, fee_bps: u64) -> Self {
    self.fee_bps = fee_bps.min(BPS_PRECISION);
    self
  }

  pub fn set_fee_bps(&mut self, fee_bps: u64) {
    self.fee_bps = fee_bps.min(BPS_PRECISION);
  }

  pub fn share_token(&self) -> Address {
    SHARE_TOKEN
  }

  /// Third-party liquidity: credits reserves and mints `shares` to `provider`
  pub fn seed_liquidity(&mut self, provider: &Address, amounts: [u128; N_COINS], shares: u128) {
    for (coin, amount) in self.coins.iter().zip(amounts) {
      self.book.mint(&coin.address, &POOL_ADDRESS, amount);
    }
    self.book.mint(&SHARE_TOKEN, provider, shares);
    self.share_supply = self.share_supply.saturating_add(shares);
  }

  fn coin(&self, slot: usize) -> Result<&SupportedAsset> {
    self
      .coins
      .get(slot)
      .ok_or_else(|| StrategyError::Pool(format!("slot {slot} out of range")))
  }

  fn reserve(&self, slot: usize) -> Result<u128> {
    Ok(self.book.balance(&self.coin(slot)?.address, &POOL_ADDRESS))
  }

  /// Sum of reserves in canonical units
  fn canonical_reserves(&self) -> Result<u128> {
    let mut total = 0u128;
    for coin in &self.coins {
      let reserve = self.book.balance(&coin.address, &POOL_ADDRESS);
      total = total
        .checked_add(to_canonical(reserve, coin.decimals)?)
        .ok_or(StrategyError::MathOverflow)?;
    }
    Ok(total)
  }

  fn charge_fee(&self, amount: u128) -> u128 {
    scale_down(amount, BPS_PRECISION - self.fee_bps, BPS_PRECISION)
  }

  fn burn_local_shares(&mut self, shares: u128) -> Result<()> {
    self
      .book
      .burn(&SHARE_TOKEN, &self.holder, shares)
      .map_err(StrategyError::Pool)?;
    self.share_supply = self
      .share_supply
      .checked_sub(shares)
      .ok_or(StrategyError::MathOverflow)?;
    Ok(())
  }
}

impl Pool for MemoryPool {
  fn add_liquidity(&mut self, amounts: [u128; N_COINS], min_shares: u128) -> Result<u128> {
    let mut deposit_value = 0u128;
    for (coin, &amount) in self.coins.iter().zip(amounts.iter()) {
      if amount == 0 {
        continue;
      }
      let held = self.book.balance(&coin.address, &self.holder);
      if held < amount {
        return Err(StrategyError::Pool(format!(
          "depositor holds {held} of {}, needs {amount}",
          coin.address
        )));
      }
      deposit_value = deposit_value
        .checked_add(to_canonical(amount, coin.decimals)?)
        .ok_or(StrategyError::MathOverflow)?;
    }
    if deposit_value == 0 {
      return Err(StrategyError::Pool("empty deposit".to_string()));
    }

    let gross = if self.share_supply == 0 {
      deposit_value
    } else {
      mul_div_down(deposit_value, self.share_supply, self.canonical_reserves()?)
        .ok_or(StrategyError::MathOverflow)?
    };
    let minted = self.charge_fee(gross);
    if minted < min_shares {
      return Err(StrategyError::Pool(format!(
        "slippage: would mint {minted} shares, minimum is {min_shares}"
      )));
    }

    for (coin, amount) in self.coins.iter().zip(amounts) {
      self
        .book
        .transfer(&coin.address, &self.holder, &POOL_ADDRESS, amount)
        .map_err(StrategyError::Pool)?;
    }
    self.book.mint(&SHARE_TOKEN, &self.holder, minted);
    self.share_supply = self
      .share_supply
      .checked_add(minted)
      .ok_or(StrategyError::MathOverflow)?;
    Ok(minted)
  }

  fn remove_liquidity_one_coin(&mut self, shares: u128, slot: usize, min_out: u128) -> Result<u128> {
    let held = self.local_share_balance()?;
    if held < shares {
      return Err(StrategyError::Pool(format!(
        "burn of {shares} shares exceeds local balance {held}"
      )));
    }
    let out = self.calc_withdraw_one_coin(shares, slot)?;
    if out < min_out {
      return Err(StrategyError::Pool(format!(
        "slippage: would return {out}, minimum is {min_out}"
      )));
    }

    let coin = self.coin(slot)?.address;
    self.burn_local_shares(shares)?;
    self
      .book
      .transfer(&coin, &POOL_ADDRESS, &self.holder, out)
      .map_err(StrategyError::Pool)?;
    Ok(out)
  }

  fn remove_liquidity(
    &mut self,
    shares: u128,
    min_amounts: [u128; N_COINS],
  ) -> Result<[u128; N_COINS]> {
    let held = self.local_share_balance()?;
    if held < shares {
      return Err(StrategyError::Pool(format!(
        "burn of {shares} shares exceeds local balance {held}"
      )));
    }

    let mut out = [0u128; N_COINS];
    for slot in 0..N_COINS {
      out[slot] = mul_div_down(self.reserve(slot)?, shares, self.share_supply)
        .ok_or(StrategyError::MathOverflow)?;
      if out[slot] < min_amounts[slot] {
        return Err(StrategyError::Pool(format!(
          "slippage: slot {slot} would return {}, minimum is {}",
          out[slot], min_amounts[slot]
        )));
      }
    }

    self.burn_local_shares(shares)?;
    for (coin, amount) in self.coins.iter().zip(out) {
      self
        .book
        .transfer(&coin.address, &POOL_ADDRESS, &self.holder, amount)
        .map_err(StrategyError::Pool)?;
    }
    Ok(out)
  }

  fn calc_withdraw_one_coin(&self, shares: u128, slot: usize) -> Result<u128> {
    let coin = self.coin(slot)?;
    if self.share_supply == 0 {
      return Ok(0);
    }
    let value = mul_div_down(shares, self.canonical_reserves()?, self.share_supply)
      .ok_or(StrategyError::MathOverflow)?;
    let amount = self.charge_fee(from_canonical(value, coin.decimals)?);
    Ok(amount.min(self.reserve(slot)?))
  }

  fn virtual_price(&self) -> Result<u128> {
    if self.share_supply == 0 {
      return Ok(PRECISION);
    }
    mul_div_down(self.canonical_reserves()?, PRECISION, self.share_supply)
      .ok_or(StrategyError::MathOverflow)
  }

  fn reserve_balance(&self, slot: usize) -> Result<u128> {
    self.reserve(slot)
  }

  fn coin_at(&self, slot: usize) -> Result<Address> {
    Ok(self.coin(slot)?.address)
  }

  fn share_total_supply(&self) -> Result<u128> {
    Ok(self.share_supply)
  }

  fn local_share_balance(&self) -> Result<u128> {
    Ok(self.book.balance(&SHARE_TOKEN, &self.holder))
  }
}

/// Single-depositor gauge holding pool shares at [`GAUGE_ADDRESS`]
#[derive(Debug, Clone)]
pub struct MemoryGauge {
  book: MemoryBook,
  share_token: Address,
  holder: Address,
  /// Shares withheld on every release; non-zero models a faulty sink
  release_haircut: u128,
}

impl MemoryGauge {
  pub fn new(book: MemoryBook, share_token: Address, holder: Address) -> Self {
    Self { book, share_token, holder, release_haircut: 0 }
  }

  pub fn set_release_haircut(&mut self, shares: u128) {
    self.release_haircut = shares;
  }

  /// Stake part of the local balance
  pub fn stake(&mut self, shares: u128) -> Result<()> {
    self
      .book
      .transfer(&self.share_token, &self.holder, &GAUGE_ADDRESS, shares)
      .map_err(StrategyError::Staking)
  }
}

impl StakingSink for MemoryGauge {
  fn deposit_all_local_shares(&mut self) -> Result<u128> {
    let local = self.book.balance(&self.share_token, &self.holder);
    self.stake(local)?;
    Ok(local)
  }

  fn deposit(&mut self, amount: u128) -> Result<()> {
    self.stake(amount)
  }

  fn withdraw(&mut self, amount: u128) -> Result<()> {
    let staked = self.staked_balance()?;
    if amount > staked {
      return Err(StrategyError::Staking(format!(
        "release of {amount} exceeds staked balance {staked}"
      )));
    }
    let delivered = amount.saturating_sub(self.release_haircut);
    self
      .book
      .transfer(&self.share_token, &GAUGE_ADDRESS, &self.holder, delivered)
      .map_err(StrategyError::Staking)
  }

  fn staked_balance(&self) -> Result<u128> {
    Ok(self.book.balance(&self.share_token, &GAUGE_ADDRESS))
  }
}

/// Coin balances of one account
#[derive(Debug, Clone)]
pub struct MemoryCustody {
  book: MemoryBook,
  holder: Address,
}

impl MemoryCustody {
  pub fn new(book: MemoryBook, holder: Address) -> Self {
    Self { book, holder }
  }
}

impl AssetCustody for MemoryCustody {
  fn balance_of(&self, asset: &Address) -> Result<u128> {
    Ok(self.book.balance(asset, &self.holder))
  }

  fn pull_from(&mut self, asset: &Address, owner: &Address, amount: u128) -> Result<()> {
    self
      .book
      .transfer(asset, owner, &self.holder, amount)
      .map_err(StrategyError::Custody)
  }

  fn push_to(&mut self, asset: &Address, recipient: &Address, amount: u128) -> Result<()> {
    self
      .book
      .transfer(asset, &self.holder, recipient, amount)
      .map_err(StrategyError::Custody)
  }
}
