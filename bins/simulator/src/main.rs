//! Runs one deposit / withdraw / exit cycle against in-memory collaborators
//! using the strategy configured in the environment.

use anyhow::Context;
use tracing::info;

use tripool_config::{StakingBackend, StrategyConfig};
use tripool_core::constants::PRECISION;
use tripool_core::{Address, AssetIndexMap};
use tripool_strategy::memory::{MemoryBook, MemoryCustody, MemoryGauge, MemoryPool};
use tripool_strategy::{NoStaking, StakingSink, Strategy, StrategySettings};

const STRATEGY: Address = Address([0x5a; 20]);
const LIQUIDITY_PROVIDER: Address = Address([0x1f; 20]);
const RECIPIENT: Address = Address([0xee; 20]);

/// Whole coins seeded into the pool per slot by the outside provider
const POOL_DEPTH: u128 = 1_000_000;
/// Whole coins the vault deposits per slot
const VAULT_FUNDING: u128 = 10_000;

fn main() -> anyhow::Result<()> {
  let config = StrategyConfig::from_env().context("loading strategy configuration")?;
  tripool_telemetry::init(&config.log_filter)?;

  info!(
    vault = %config.vault,
    slippage_bps = config.slippage_bps,
    staking = ?config.staking,
    "simulator starting"
  );

  AssetIndexMap::new(config.assets).context("validating configured coins")?;

  let book = MemoryBook::new();
  let mut pool = MemoryPool::new(book.clone(), config.assets, STRATEGY);

  let mut depth = [0u128; 3];
  for coin in &config.assets {
    depth[coin.slot] = POOL_DEPTH * 10u128.pow(u32::from(coin.decimals));
  }
  pool.seed_liquidity(&LIQUIDITY_PROVIDER, depth, 3 * POOL_DEPTH * PRECISION);

  let sink: Box<dyn StakingSink> = match config.staking {
    StakingBackend::Gauge => Box::new(MemoryGauge::new(book.clone(), pool.share_token(), STRATEGY)),
    StakingBackend::None => Box::new(NoStaking),
  };
  let custody = MemoryCustody::new(book.clone(), STRATEGY);

  let settings = StrategySettings {
    vault: config.vault,
    assets: config.assets,
    slippage_bps: config.slippage_bps,
  };
  let mut strategy =
    Strategy::new(settings, pool, sink, custody).context("validating strategy against pool")?;

  for coin in &config.assets {
    let amount = VAULT_FUNDING * 10u128.pow(u32::from(coin.decimals));
    book.mint(&coin.address, &config.vault, amount);
    let minted = strategy
      .deposit(&coin.address, amount)
      .with_context(|| format!("depositing {amount} of {}", coin.address))?;
    info!(asset = %coin.address, amount, minted, "deposited");
  }

  let ledger = strategy.ledger()?;
  info!(local = ledger.local, staked = ledger.staked, total = ledger.total(), "ledger after deposits");

  for coin in &config.assets {
    let value = strategy.check_balance(&coin.address)?;
    info!(asset = %coin.address, value, "reported balance");
  }

  let target = config
    .assets
    .iter()
    .find(|c| c.slot == 1)
    .context("no coin configured for slot 1")?;
  let amount = VAULT_FUNDING / 4 * 10u128.pow(u32::from(target.decimals));
  let paid = strategy
    .withdraw(&RECIPIENT, &target.address, amount)
    .with_context(|| format!("withdrawing {amount} of {}", target.address))?;
  info!(asset = %target.address, requested = amount, paid, "partial withdrawal");

  let forwarded = strategy.withdraw_all().context("withdrawing all shares")?;
  info!(forwarded = ?forwarded, "full exit");

  for coin in &config.assets {
    info!(
      asset = %coin.address,
      vault = book.balance(&coin.address, &config.vault),
      recipient = book.balance(&coin.address, &RECIPIENT),
      "final balances"
    );
  }

  Ok(())
}
