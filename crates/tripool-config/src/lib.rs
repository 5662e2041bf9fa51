//! Environment configuration for a strategy instance
//!
//! | variable               | required | default |
//! |------------------------|----------|---------|
//! | `TRIPOOL_VAULT`        | yes      |         |
//! | `TRIPOOL_ASSETS`       | yes      |         |
//! | `TRIPOOL_SLIPPAGE_BPS` | no       | `100`   |
//! | `TRIPOOL_STAKING`      | no       | `gauge` |
//! | `TRIPOOL_LOG`          | no       | `info`  |
//!
//! `TRIPOOL_ASSETS` is a JSON array of `{"address", "decimals", "slot"}`
//! objects, one per pool coin.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tripool_core::constants::{BPS_PRECISION, CANONICAL_DECIMALS, DEFAULT_SLIPPAGE_BPS, N_COINS};
use tripool_core::{Address, SupportedAsset};

pub const VAULT_VAR: &str = "TRIPOOL_VAULT";
pub const ASSETS_VAR: &str = "TRIPOOL_ASSETS";
pub const SLIPPAGE_VAR: &str = "TRIPOOL_SLIPPAGE_BPS";
pub const STAKING_VAR: &str = "TRIPOOL_STAKING";
pub const LOG_VAR: &str = "TRIPOOL_LOG";

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("missing required variable {0}")]
  Missing(&'static str),

  #[error("{var} is not a valid address: {reason}")]
  InvalidAddress { var: &'static str, reason: String },

  #[error("{var} could not be parsed: {reason}")]
  Malformed { var: &'static str, reason: String },

  #[error("TRIPOOL_ASSETS must list exactly 3 coins, got {0}")]
  WrongCoinCount(usize),

  #[error("coin {address} has {decimals} decimals, at most 18 are supported")]
  TooManyDecimals { address: Address, decimals: u8 },

  #[error("TRIPOOL_SLIPPAGE_BPS must be below 10000, got {0}")]
  SlippageOutOfRange(u64),

  #[error("unknown staking backend `{0}`, expected `gauge` or `none`")]
  UnknownStakingBackend(String),
}

/// Where idle pool shares are parked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StakingBackend {
  #[default]
  Gauge,
  None,
}

impl FromStr for StakingBackend {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "gauge" => Ok(Self::Gauge),
      "none" => Ok(Self::None),
      other => Err(ConfigError::UnknownStakingBackend(other.to_string())),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyConfig {
  pub vault: Address,
  pub assets: [SupportedAsset; N_COINS],
  pub slippage_bps: u64,
  pub staking: StakingBackend,
  /// `tracing_subscriber::EnvFilter` directive
  pub log_filter: String,
}

impl StrategyConfig {
  /// Load from the process environment, after applying an optional `.env`
  pub fn from_env() -> Result<Self, ConfigError> {
    dotenvy::dotenv().ok();
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Load through `lookup`, which returns the raw value of a variable if set
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let vault_raw = required(&lookup, VAULT_VAR)?;
    let vault = Address::from_str(&vault_raw).map_err(|e| ConfigError::InvalidAddress {
      var: VAULT_VAR,
      reason: e.to_string(),
    })?;
    if vault.is_zero() {
      return Err(ConfigError::InvalidAddress {
        var: VAULT_VAR,
        reason: "zero address".to_string(),
      });
    }

    let assets = parse_assets(&required(&lookup, ASSETS_VAR)?)?;

    let slippage_bps = match optional(&lookup, SLIPPAGE_VAR) {
      Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::Malformed {
        var: SLIPPAGE_VAR,
        reason: e.to_string(),
      })?,
      None => DEFAULT_SLIPPAGE_BPS,
    };
    if slippage_bps >= BPS_PRECISION {
      return Err(ConfigError::SlippageOutOfRange(slippage_bps));
    }

    let staking = match optional(&lookup, STAKING_VAR) {
      Some(raw) => raw.parse()?,
      None => StakingBackend::default(),
    };

    let log_filter =
      optional(&lookup, LOG_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    Ok(Self { vault, assets, slippage_bps, staking, log_filter })
  }
}

fn optional<F>(lookup: &F, var: &'static str) -> Option<String>
where
  F: Fn(&str) -> Option<String>,
{
  lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
  F: Fn(&str) -> Option<String>,
{
  optional(lookup, var).ok_or(ConfigError::Missing(var))
}

/// Slot uniqueness and address checks happen when the strategy builds its
/// asset map; this only checks shape and decimals.
fn parse_assets(raw: &str) -> Result<[SupportedAsset; N_COINS], ConfigError> {
  let listed: Vec<SupportedAsset> =
    serde_json::from_str(raw).map_err(|e| ConfigError::Malformed {
      var: ASSETS_VAR,
      reason: e.to_string(),
    })?;

  if let Some(coin) = listed.iter().find(|c| c.decimals > CANONICAL_DECIMALS) {
    return Err(ConfigError::TooManyDecimals { address: coin.address, decimals: coin.decimals });
  }

  let count = listed.len();
  listed.try_into().map_err(|_| ConfigError::WrongCoinCount(count))
}
