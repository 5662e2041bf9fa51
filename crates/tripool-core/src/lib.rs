//! Accounting primitives shared by the tripool strategy crates.
//! Everything here is pure: fixed-point math, decimal scaling, the slippage
//! bound, the asset/slot bijection and the share-ledger value types.

pub mod assets;
pub mod constants;
pub mod decimals;
pub mod error;
pub mod invariants;
pub mod math;
pub mod slippage;
pub mod types;

pub use assets::AssetIndexMap;
pub use error::{Result, StrategyError};
pub use slippage::SlippageGuard;
pub use types::{Address, LedgerState, PoolSnapshot, SupportedAsset};
