use serde::Serialize;
use tracing::debug;

use tripool_core::constants::N_COINS;
use tripool_core::decimals::from_canonical;
use tripool_core::math::mul_div_down;
use tripool_core::{
  Address, AssetIndexMap, LedgerState, PoolSnapshot, Result, SlippageGuard, StrategyError,
};

/// Arguments for a single-coin redemption plus the tier move it needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WithdrawalPlan {
  pub slot: usize,
  /// Coin amount obtainable by redeeming every owned share into this slot
  pub max_asset_amount: u128,
  pub shares_to_redeem: u128,
  /// Portion of `shares_to_redeem` that must first leave the staking sink
  pub shares_from_stake: u128,
  /// Lowest coin output the pool may return, native decimals
  pub min_asset_out: u128,
}

/// Work out the exact share burn for a partial withdrawal of one coin
///
/// # Arguments
/// * `assets` - Configured coin set
/// * `guard` - Slippage tolerance
/// * `asset` - Coin to withdraw
/// * `target_amount` - Coin amount requested, native decimals
/// * `recipient` - Destination of the withdrawn coin
/// * `ledger` - Share totals read at the start of the operation
/// * `quote_one_coin` - Pool quote `calc_withdraw_one_coin(shares, slot)`;
///   invoked once, after every precondition passes
///
/// # Returns
/// The plan, or the first failing precondition
pub fn plan_withdrawal<Q>(
  assets: &AssetIndexMap,
  guard: &SlippageGuard,
  asset: &Address,
  target_amount: u128,
  recipient: &Address,
  ledger: &LedgerState,
  quote_one_coin: Q,
) -> Result<WithdrawalPlan>
where
  Q: FnOnce(u128, usize) -> Result<u128>,
{
  if target_amount == 0 {
    return Err(StrategyError::InvalidAmount);
  }
  if recipient.is_zero() {
    return Err(StrategyError::InvalidRecipient);
  }
  let supported = assets.get(asset)?;
  if ledger.total() == 0 {
    return Err(StrategyError::NoShares);
  }

  let max_asset_amount = quote_one_coin(ledger.total(), supported.slot)?;
  if max_asset_amount == 0 {
    return Err(StrategyError::InvalidPoolState("single-coin quote is zero"));
  }

  // one multiply-then-divide: no intermediate rounding
  let shares_to_redeem = mul_div_down(ledger.total(), target_amount, max_asset_amount)
    .ok_or(StrategyError::MathOverflow)?;
  // a target too small to burn a single share would pay out nothing
  if shares_to_redeem == 0 {
    return Err(StrategyError::InvalidAmount);
  }
  let shares_from_stake = ledger.shortfall(shares_to_redeem);

  // bound applied in the coin's precision, not the share's
  let native_equivalent = from_canonical(shares_to_redeem, supported.decimals)?;
  let min_asset_out = guard.min_acceptable(native_equivalent);

  debug!(
    asset = %supported.address,
    slot = supported.slot,
    target_amount,
    max_asset_amount,
    shares_to_redeem,
    shares_from_stake,
    min_asset_out,
    "withdrawal planned"
  );

  Ok(WithdrawalPlan {
    slot: supported.slot,
    max_asset_amount,
    shares_to_redeem,
    shares_from_stake,
    min_asset_out,
  })
}

/// Arguments for the pool's proportional full exit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WithdrawAllPlan {
  pub shares: u128,
  pub shares_from_stake: u128,
  /// Slippage-bounded share of each reserve, native decimals
  pub min_amounts: [u128; N_COINS],
}

impl WithdrawAllPlan {
  pub fn is_empty(&self) -> bool {
    self.shares == 0
  }
}

/// Redeem every owned share, bounding each slot by the proportional claim
pub fn plan_withdraw_all(
  guard: &SlippageGuard,
  ledger: &LedgerState,
  snapshot: &PoolSnapshot,
) -> Result<WithdrawAllPlan> {
  let shares = ledger.total();
  if shares == 0 {
    return Ok(WithdrawAllPlan { shares: 0, shares_from_stake: 0, min_amounts: [0; N_COINS] });
  }
  if snapshot.share_supply == 0 {
    return Err(StrategyError::InvalidPoolState("share supply is zero while shares are owned"));
  }

  let mut min_amounts = [0u128; N_COINS];
  for (slot, reserve) in snapshot.reserves.iter().enumerate() {
    let claim = mul_div_down(shares, *reserve, snapshot.share_supply)
      .ok_or(StrategyError::MathOverflow)?;
    min_amounts[slot] = guard.min_acceptable(claim);
  }

  debug!(shares, staked = ledger.staked, ?min_amounts, "withdraw-all planned");

  Ok(WithdrawAllPlan {
    shares,
    shares_from_stake: ledger.staked,
    min_amounts,
  })
}
