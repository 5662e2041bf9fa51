//! Conversion between a coin's native precision and the canonical 18-decimal
//! unit used for share valuation. Scale-down truncates toward zero.

use std::cmp::Ordering;

use crate::constants::CANONICAL_DECIMALS;
use crate::error::{Result, StrategyError};

fn scale_factor(exponent: u8, decimals: u8) -> Result<u128> {
  10u128
    .checked_pow(u32::from(exponent))
    .ok_or(StrategyError::PrecisionOverflow { decimals })
}

/// Scale `amount` from `native_decimals` into 18-decimal fixed point
///
/// # Arguments
/// * `amount` - Amount in the coin's base units
/// * `native_decimals` - Decimal precision of the coin
///
/// # Returns
/// The canonical amount, or `PrecisionOverflow` if the factor or the product
/// does not fit in u128
pub fn to_canonical(amount: u128, native_decimals: u8) -> Result<u128> {
  match native_decimals.cmp(&CANONICAL_DECIMALS) {
    Ordering::Equal => Ok(amount),
    Ordering::Less => {
      let factor = scale_factor(CANONICAL_DECIMALS - native_decimals, native_decimals)?;
      amount
        .checked_mul(factor)
        .ok_or(StrategyError::PrecisionOverflow { decimals: native_decimals })
    }
    Ordering::Greater => {
      let factor = scale_factor(native_decimals - CANONICAL_DECIMALS, native_decimals)?;
      Ok(amount / factor)
    }
  }
}

/// Inverse of [`to_canonical`]: scale an 18-decimal amount into the coin's
/// native precision
pub fn from_canonical(canonical_amount: u128, native_decimals: u8) -> Result<u128> {
  match native_decimals.cmp(&CANONICAL_DECIMALS) {
    Ordering::Equal => Ok(canonical_amount),
    Ordering::Less => {
      let factor = scale_factor(CANONICAL_DECIMALS - native_decimals, native_decimals)?;
      Ok(canonical_amount / factor)
    }
    Ordering::Greater => {
      let factor = scale_factor(native_decimals - CANONICAL_DECIMALS, native_decimals)?;
      canonical_amount
        .checked_mul(factor)
        .ok_or(StrategyError::PrecisionOverflow { decimals: native_decimals })
    }
  }
}
