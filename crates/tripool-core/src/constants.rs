//! Protocol-wide constants

// PRECISION CONSTANTS
pub const CANONICAL_DECIMALS: u8 = 18;
pub const PRECISION: u128 = 1_000_000_000_000_000_000; // 1e18
pub const BPS_PRECISION: u64 = 10_000;                 // 100% = 10000 bps

// POOL SHAPE
pub const N_COINS: usize = 3;

// SLIPPAGE
pub const DEFAULT_SLIPPAGE_BPS: u64 = 100;             // 1%, the pool's own default tolerance
