//! Fixed bijection between the three supported coins and pool slots

use crate::constants::N_COINS;
use crate::error::{Result, StrategyError};
use crate::types::{Address, SupportedAsset};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetIndexMap {
  /// Indexed by slot
  by_slot: [SupportedAsset; N_COINS],
}

impl AssetIndexMap {
  /// Validate and freeze the coin set
  ///
  /// Slots must be a permutation of {0, 1, 2}, addresses must be distinct and
  /// non-zero. Input order does not matter.
  pub fn new(assets: [SupportedAsset; N_COINS]) -> Result<Self> {
    let mut by_slot: [Option<SupportedAsset>; N_COINS] = [None; N_COINS];

    for asset in assets {
      if asset.address.is_zero() {
        return Err(StrategyError::InvalidConfiguration(
          "asset address must not be zero".to_string(),
        ));
      }
      if asset.slot >= N_COINS {
        return Err(StrategyError::InvalidConfiguration(format!(
          "asset {} has slot {} outside 0..{}",
          asset.address, asset.slot, N_COINS
        )));
      }
      if by_slot.iter().flatten().any(|a| a.address == asset.address) {
        return Err(StrategyError::InvalidConfiguration(format!(
          "asset {} configured twice",
          asset.address
        )));
      }
      let entry = &mut by_slot[asset.slot];
      if entry.is_some() {
        return Err(StrategyError::InvalidConfiguration(format!(
          "slot {} assigned to more than one asset",
          asset.slot
        )));
      }
      *entry = Some(asset);
    }

    // three distinct in-range slots fill every entry
    let [a, b, c] = by_slot;
    match (a, b, c) {
      (Some(a), Some(b), Some(c)) => Ok(Self { by_slot: [a, b, c] }),
      _ => Err(StrategyError::InvalidConfiguration(
        "slots are not a permutation of 0..3".to_string(),
      )),
    }
  }

  /// Pool slot of `asset`, or `UnsupportedAsset`
  pub fn index_of(&self, asset: &Address) -> Result<usize> {
    self.get(asset).map(|a| a.slot)
  }

  pub fn get(&self, asset: &Address) -> Result<&SupportedAsset> {
    self
      .by_slot
      .iter()
      .find(|a| a.address == *asset)
      .ok_or(StrategyError::UnsupportedAsset(*asset))
  }

  pub fn is_supported(&self, asset: &Address) -> bool {
    self.by_slot.iter().any(|a| a.address == *asset)
  }

  pub fn asset_at(&self, slot: usize) -> Option<&SupportedAsset> {
    self.by_slot.get(slot)
  }

  /// Assets in slot order
  pub fn iter(&self) -> impl Iterator<Item = &SupportedAsset> {
    self.by_slot.iter()
  }
}
