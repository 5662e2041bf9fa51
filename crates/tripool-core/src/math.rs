//! Pure fixed-point helpers for the strategy's share accounting
//! Products are formed in 256 bits: an 18-decimal amount times an 18-decimal
//! rate already exceeds u128 for balances above ~340 units.

use uint::construct_uint;

construct_uint! {
  pub struct U256(4);
}

fn narrow(value: U256) -> Option<u128> {
  if value.bits() > 128 {
    return None;
  }
  Some(value.as_u128())
}

/// Multiply two u128 values and divide by a third, rounding DOWN
/// Returns None on division by zero or if the quotient exceeds u128
pub fn mul_div_down(a: u128, b: u128, c: u128) -> Option<u128> {
  if c == 0 {
    return None;
  }

  let result = U256::from(a)
    .checked_mul(U256::from(b))?
    .checked_div(U256::from(c))?;

  narrow(result)
}

/// Multiply two u128 values and divide by a third, rounding UP
/// Returns None on division by zero or if the quotient exceeds u128
pub fn mul_div_up(a: u128, b: u128, c: u128) -> Option<u128> {
  if c == 0 {
    return None;
  }

  let numerator = U256::from(a).checked_mul(U256::from(b))?;
  let denominator = U256::from(c);
  let mut result = numerator / denominator;
  if !(numerator % denominator).is_zero() {
    result = result.checked_add(U256::one())?;
  }

  narrow(result)
}

/// `value * numerator / denominator` where the ratio is known to be <= 1.
/// Cannot overflow, so it returns the bare quotient.
pub fn scale_down(value: u128, numerator: u64, denominator: u64) -> u128 {
  debug_assert!(numerator <= denominator && denominator > 0);
  // quotient never exceeds `value`
  (U256::from(value) * U256::from(numerator) / U256::from(denominator)).as_u128()
}
