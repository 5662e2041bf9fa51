use serde::Serialize;
use tracing::debug;

use tripool_core::constants::{N_COINS, PRECISION};
use tripool_core::decimals::to_canonical;
use tripool_core::math::mul_div_down;
use tripool_core::{Address, AssetIndexMap, PoolSnapshot, Result, SlippageGuard, StrategyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositRequest {
  pub asset: Address,
  /// Amount in the asset's native decimals
  pub amount: u128,
}

/// Arguments for the pool's multi-coin deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DepositPlan {
  /// Raw native amounts per pool slot
  pub amounts: [u128; N_COINS],
  /// Shares the deposit is worth at the snapshot's virtual price
  pub ideal_shares: u128,
  /// Lowest share mint the pool may return
  pub min_shares: u128,
}

/// Build the per-slot deposit vector and the minimum shares to accept
///
/// # Arguments
/// * `assets` - Configured coin set
/// * `guard` - Slippage tolerance
/// * `requests` - Ordered (asset, amount) pairs; repeated assets are summed
/// * `snapshot` - The operation's single pool read
///
/// # Returns
/// `NothingToDeposit` if every amount is zero, `UnsupportedAsset` if any
/// request names a coin outside the pool
pub fn plan_deposit(
  assets: &AssetIndexMap,
  guard: &SlippageGuard,
  requests: &[DepositRequest],
  snapshot: &PoolSnapshot,
) -> Result<DepositPlan> {
  let mut amounts = [0u128; N_COINS];
  let mut ideal_shares = 0u128;

  for request in requests {
    let asset = assets.get(&request.asset)?;
    if request.amount == 0 {
      continue;
    }

    if snapshot.virtual_price == 0 {
      return Err(StrategyError::InvalidPoolState("virtual price is zero"));
    }

    let canonical = to_canonical(request.amount, asset.decimals)?;
    let shares = mul_div_down(canonical, PRECISION, snapshot.virtual_price)
      .ok_or(StrategyError::MathOverflow)?;

    debug!(
      asset = %asset.address,
      slot = asset.slot,
      amount = request.amount,
      canonical,
      shares,
      "deposit leg priced"
    );

    ideal_shares = ideal_shares
      .checked_add(shares)
      .ok_or(StrategyError::MathOverflow)?;
    amounts[asset.slot] = amounts[asset.slot]
      .checked_add(request.amount)
      .ok_or(StrategyError::MathOverflow)?;
  }

  if amounts.iter().all(|&a| a == 0) {
    return Err(StrategyError::NothingToDeposit);
  }

  let min_shares = guard.min_acceptable(ideal_shares);
  debug!(?amounts, ideal_shares, min_shares, "deposit planned");

  Ok(DepositPlan { amounts, ideal_shares, min_shares })
}
