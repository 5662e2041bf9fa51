use thiserror::Error;

use crate::constants::N_COINS;
use crate::types::Address;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StrategyError {
  #[error("Asset {0} is not one of the configured pool coins")]
  UnsupportedAsset(Address),

  #[error("Amount must be greater than zero")]
  InvalidAmount,

  #[error("Withdrawal recipient is unset")]
  InvalidRecipient,

  #[error("Every deposit request amount is zero - nothing to deposit")]
  NothingToDeposit,

  #[error("Insufficient pool shares: required {required}, available {available}")]
  InsufficientShares { required: u128, available: u128 },

  #[error("Strategy owns no pool shares")]
  NoShares,

  #[error("Decimal scaling overflowed for an asset with {decimals} decimals")]
  PrecisionOverflow { decimals: u8 },

  #[error("Math overflow occurred - values exceeded fixed-point bounds")]
  MathOverflow,

  #[error("Invalid pool state: {0}")]
  InvalidPoolState(&'static str),

  #[error("Invalid configuration: {0}")]
  InvalidConfiguration(String),

  #[error("Share ledger drift: expected {expected} total shares, found {actual}")]
  LedgerDrift { expected: u128, actual: u128 },

  #[error("Pool rejected the call: {0}")]
  Pool(String),

  #[error("Staking sink rejected the call: {0}")]
  Staking(String),

  #[error("Asset custody rejected the call: {0}")]
  Custody(String),

  #[error("Deposit minted {shares_minted} shares that stay unstaked: {reason}")]
  DepositUnstaked { shares_minted: u128, reason: String },

  #[error(
    "Burned {shares_burned} shares for {received} coin, {forwarded_to_vault} forwarded to the vault, delivery failed: {reason}"
  )]
  WithdrawalUndelivered {
    shares_burned: u128,
    received: u128,
    /// Coin the vault received instead of, or on top of, the recipient's share
    forwarded_to_vault: u128,
    reason: String,
  },

  #[error("Burned {shares_burned} shares, {stranded:?} per slot still held by the strategy: {reason}")]
  ForwardIncomplete { shares_burned: u128, stranded: [u128; N_COINS], reason: String },
}

pub type Result<T> = std::result::Result<T, StrategyError>;
