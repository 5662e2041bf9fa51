use tracing::debug;

use tripool_core::math::mul_div_down;
use tripool_core::{Address, AssetIndexMap, LedgerState, PoolSnapshot, Result, StrategyError};

/// Strategy's proportional claim on one coin's reserve
///
/// # Arguments
/// * `assets` - Configured coin set
/// * `asset` - Coin to value
/// * `ledger` - Local plus staked shares
/// * `snapshot` - The operation's single pool read
///
/// # Returns
/// `total * reserve[slot] / share_supply` in the coin's native decimals;
/// 0 for an empty pool. This is a point-in-time estimate, not what a
/// single-coin redemption of the same size would return.
pub fn value_of(
  assets: &AssetIndexMap,
  asset: &Address,
  ledger: &LedgerState,
  snapshot: &PoolSnapshot,
) -> Result<u128> {
  let slot = assets.index_of(asset)?;

  if snapshot.share_supply == 0 {
    return Ok(0);
  }

  let value = mul_div_down(ledger.total(), snapshot.reserves[slot], snapshot.share_supply)
    .ok_or(StrategyError::MathOverflow)?;

  debug!(asset = %asset, slot, shares = ledger.total(), value, "position valued");
  Ok(value)
}
