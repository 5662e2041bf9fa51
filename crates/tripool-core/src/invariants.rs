//! Invariant assertions for the share ledger
//! Every state-changing strategy operation checks these after its pool call

use crate::error::{Result, StrategyError};
use crate::types::LedgerState;

/// Assert the strategy owns at least `required` shares across both tiers
pub fn assert_shares_available(ledger: &LedgerState, required: u128) -> Result<()> {
  if ledger.total() < required {
    return Err(StrategyError::InsufficientShares {
      required,
      available: ledger.total(),
    });
  }
  Ok(())
}

/// Assert local custody covers a burn of `required` shares
pub fn assert_local_covers(ledger: &LedgerState, required: u128) -> Result<()> {
  if ledger.local < required {
    return Err(StrategyError::InsufficientShares {
      required,
      available: ledger.local,
    });
  }
  Ok(())
}

/// Assert the ledger moved by exactly the shares minted or burned
///
/// # Arguments
/// * `before` - Ledger read at the start of the operation
/// * `minted` - Shares the pool reported minting
/// * `burned` - Shares handed to the pool for redemption
/// * `after` - Ledger read after the pool call and tier moves
pub fn assert_ledger_conserved(
  before: &LedgerState,
  minted: u128,
  burned: u128,
  after: &LedgerState,
) -> Result<()> {
  let expected = before
    .total()
    .checked_add(minted)
    .and_then(|v| v.checked_sub(burned))
    .ok_or(StrategyError::MathOverflow)?;

  if after.total() != expected {
    return Err(StrategyError::LedgerDrift {
      expected,
      actual: after.total(),
    });
  }
  Ok(())
}
