//! Slippage bound applied to every ideal conversion amount

use serde::Serialize;

use crate::constants::{BPS_PRECISION, DEFAULT_SLIPPAGE_BPS};
use crate::error::{Result, StrategyError};
use crate::math::scale_down;

/// Maximum tolerated adverse deviation, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlippageGuard {
  slippage_bps: u64,
}

impl SlippageGuard {
  /// # Arguments
  /// * `slippage_bps` - Tolerance in basis points (100 = 1%); must be below 10_000
  pub fn new(slippage_bps: u64) -> Result<Self> {
    if slippage_bps >= BPS_PRECISION {
      return Err(StrategyError::InvalidConfiguration(format!(
        "slippage of {slippage_bps} bps leaves no acceptable output"
      )));
    }
    Ok(Self { slippage_bps })
  }

  pub fn slippage_bps(&self) -> u64 {
    self.slippage_bps
  }

  /// `ideal * (1 - slippage)`, truncated so the bound never exceeds `ideal`
  pub fn min_acceptable(&self, ideal_amount: u128) -> u128 {
    scale_down(ideal_amount, BPS_PRECISION - self.slippage_bps, BPS_PRECISION)
  }
}

impl Default for SlippageGuard {
  fn default() -> Self {
    Self { slippage_bps: DEFAULT_SLIPPAGE_BPS }
  }
}
