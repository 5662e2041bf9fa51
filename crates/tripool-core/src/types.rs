//! Value types for the strategy's view of the world
//! None of these are persisted; they are rebuilt from collaborator reads

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::N_COINS;
use crate::error::{Result, StrategyError};

/// 20-byte account / token identifier
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
  pub const ZERO: Address = Address([0u8; 20]);

  pub fn is_zero(&self) -> bool {
    self.0 == [0u8; 20]
  }
}

impl fmt::Display for Address {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "0x{}", hex::encode(self.0))
  }
}

impl fmt::Debug for Address {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(self, f)
  }
}

impl FromStr for Address {
  type Err = hex::FromHexError;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let mut bytes = [0u8; 20];
    hex::decode_to_slice(digits, &mut bytes)?;
    Ok(Address(bytes))
  }
}

impl Serialize for Address {
  fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for Address {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
  }
}

/// One of the three pool coins the strategy accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedAsset {
  pub address: Address,
  /// Native decimal precision of the token
  pub decimals: u8,
  /// Coin index inside the pool (0, 1 or 2)
  pub slot: usize,
}

/// Point-in-time read of the pool.
/// Every computation inside one operation must use a single snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolSnapshot {
  /// Value of one share in canonical (1e18) units
  pub virtual_price: u128,
  /// Per-slot reserve balances, in each coin's native decimals
  pub reserves: [u128; N_COINS],
  /// Total supply of the pool share token
  pub share_supply: u128,
}

/// Pool shares owned by the strategy, split between the two custody tiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LedgerState {
  /// Shares held directly by the strategy
  pub local: u128,
  /// Shares deposited in the staking sink
  pub staked: u128,
  total: u128,
}

impl LedgerState {
  pub fn new(local: u128, staked: u128) -> Result<Self> {
    let total = local.checked_add(staked).ok_or(StrategyError::MathOverflow)?;
    Ok(Self { local, staked, total })
  }

  pub fn total(&self) -> u128 {
    self.total
  }

  /// Shares that must leave the staking sink before `required` can be burned
  pub fn shortfall(&self, required: u128) -> u128 {
    required.saturating_sub(self.local)
  }
}
