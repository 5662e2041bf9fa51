//! Public strategy operations
//!
//! Each operation follows the same order:
//! 1. read the ledger and (at most once) the pool snapshot
//! 2. plan with pure quote functions; every precondition fails here
//! 3. call collaborators
//! 4. re-read the ledger and check conservation
//!
//! `&mut self` on every mutating operation gives the exclusive execution the
//! ledger needs; two operations on one strategy cannot interleave.

use tracing::{info, warn};

use tripool_core::constants::N_COINS;
use tripool_core::invariants::assert_ledger_conserved;
use tripool_core::{
  Address, AssetIndexMap, LedgerState, Result, SlippageGuard, StrategyError, SupportedAsset,
};
use tripool_quote::{plan_deposit, plan_withdraw_all, plan_withdrawal, value_of, DepositRequest};

use crate::events::StrategyEvent;
use crate::interfaces::{AssetCustody, Pool, StakingSink};
use crate::ledger::ShareLedger;

/// Construction-time configuration, immutable afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategySettings {
  /// Owning vault: source of deposits, destination of dust and full exits
  pub vault: Address,
  pub assets: [SupportedAsset; N_COINS],
  pub slippage_bps: u64,
}

pub struct Strategy<P, S, C> {
  vault: Address,
  assets: AssetIndexMap,
  guard: SlippageGuard,
  pool: P,
  sink: S,
  custody: C,
}

impl<P, S, C> Strategy<P, S, C>
where
  P: Pool,
  S: StakingSink,
  C: AssetCustody,
{
  /// Validate the settings against the live pool and build the strategy
  ///
  /// Fails with `InvalidConfiguration` if the vault is unset, the coin set is
  /// not a slot permutation, the slippage is out of range, or a configured
  /// coin does not match `pool.coin_at(slot)`.
  pub fn new(settings: StrategySettings, pool: P, sink: S, custody: C) -> Result<Self> {
    if settings.vault.is_zero() {
      return Err(StrategyError::InvalidConfiguration("vault address is unset".to_string()));
    }
    let assets = AssetIndexMap::new(settings.assets)?;
    let guard = SlippageGuard::new(settings.slippage_bps)?;

    for asset in assets.iter() {
      let coin = pool.coin_at(asset.slot)?;
      if coin != asset.address {
        return Err(StrategyError::InvalidConfiguration(format!(
          "slot {} holds {coin} in the pool, configured as {}",
          asset.slot, asset.address
        )));
      }
    }

    info!(
      vault = %settings.vault,
      slippage_bps = guard.slippage_bps(),
      "strategy configured"
    );

    Ok(Self { vault: settings.vault, assets, guard, pool, sink, custody })
  }

  fn share_ledger(&mut self) -> ShareLedger<'_, P, S> {
    ShareLedger::new(&self.pool, &mut self.sink)
  }

  pub fn vault(&self) -> Address {
    self.vault
  }

  pub fn slippage(&self) -> SlippageGuard {
    self.guard
  }

  pub fn supports_asset(&self, asset: &Address) -> bool {
    self.assets.is_supported(asset)
  }

  /// Configured coins in slot order
  pub fn want_coins(&self) -> impl Iterator<Item = &SupportedAsset> {
    self.assets.iter()
  }

  pub fn pool(&self) -> &P {
    &self.pool
  }

  pub fn sink(&self) -> &S {
    &self.sink
  }

  pub fn custody(&self) -> &C {
    &self.custody
  }

  /// Current local/staked split
  pub fn ledger(&self) -> Result<LedgerState> {
    ShareLedger::read(&self.pool, &self.sink)
  }

  /// Reported value of `asset` held through pool shares, native decimals
  pub fn check_balance(&self, asset: &Address) -> Result<u128> {
    let ledger = self.ledger()?;
    let snapshot = self.pool.snapshot()?;
    value_of(&self.assets, asset, &ledger, &snapshot)
  }

  /// Pull `amount` of `asset` from the vault and convert it into staked shares
  ///
  /// # Returns
  /// Shares minted by the pool
  pub fn deposit(&mut self, asset: &Address, amount: u128) -> Result<u128> {
    let request = DepositRequest { asset: *asset, amount };
    self.execute_deposit(&[request], true)
  }

  /// Convert every coin balance the strategy already holds into staked shares
  pub fn deposit_all(&mut self) -> Result<u128> {
    let mut requests = Vec::with_capacity(N_COINS);
    for asset in self.assets.iter() {
      requests.push(DepositRequest {
        asset: asset.address,
        amount: self.custody.balance_of(&asset.address)?,
      });
    }
    self.execute_deposit(&requests, false)
  }

  fn execute_deposit(&mut self, requests: &[DepositRequest], pull_from_vault: bool) -> Result<u128> {
    let before = self.ledger()?;
    let snapshot = self.pool.snapshot()?;
    let plan = plan_deposit(&self.assets, &self.guard, requests, &snapshot)?;

    let mut pulled: Vec<(Address, u128)> = Vec::new();
    if pull_from_vault {
      for request in requests.iter().filter(|r| r.amount > 0) {
        if let Err(err) = self.custody.pull_from(&request.asset, &self.vault, request.amount) {
          self.refund_vault(&pulled);
          return Err(err);
        }
        pulled.push((request.asset, request.amount));
      }
    }

    let minted = match self.pool.add_liquidity(plan.amounts, plan.min_shares) {
      Ok(minted) => minted,
      Err(err) => {
        warn!(error = %err, "add_liquidity rejected, returning pulled coins to vault");
        self.refund_vault(&pulled);
        return Err(err);
      }
    };

    // shares are minted: later failures are reported with what was committed
    let stake_failure = self.share_ledger().stake_all_local().err();
    if let Some(err) = &stake_failure {
      warn!(minted, error = %err, "staking failed, minted shares stay local");
    }

    let after = self.ledger()?;
    assert_ledger_conserved(&before, minted, 0, &after)?;

    info!(
      amounts = ?plan.amounts,
      min_shares = plan.min_shares,
      minted,
      total_shares = after.total(),
      "deposit complete"
    );
    StrategyEvent::Deposited {
      amounts: plan.amounts,
      min_shares: plan.min_shares,
      shares_minted: minted,
      total_shares: after.total(),
    }
    .emit();

    match stake_failure {
      Some(err) => Err(StrategyError::DepositUnstaked { shares_minted: minted, reason: err.to_string() }),
      None => Ok(minted),
    }
  }

  fn refund_vault(&mut self, pulled: &[(Address, u128)]) {
    for (asset, amount) in pulled {
      if let Err(err) = self.custody.push_to(asset, &self.vault, *amount) {
        warn!(asset = %asset, amount, error = %err, "failed to return pulled coins to vault");
      }
    }
  }

  /// Re-stake shares released for a redemption the pool then refused
  fn restake_after_failed_burn(&mut self, released: u128) {
    if let Err(err) = self.share_ledger().restake(released) {
      warn!(released, error = %err, "failed to re-stake released shares");
    }
  }

  /// Withdraw `amount` of `asset` to `recipient`
  ///
  /// Burns the proportional share count, releasing shares from stake first if
  /// local custody is short. Coin received beyond `amount` goes to the vault.
  ///
  /// # Returns
  /// Amount delivered to `recipient`. Once shares are burned, a failed
  /// transfer sends the whole proceeds to the vault instead and yields
  /// `WithdrawalUndelivered`.
  pub fn withdraw(&mut self, recipient: &Address, asset: &Address, amount: u128) -> Result<u128> {
    let before = self.ledger()?;
    let pool = &self.pool;
    let plan = plan_withdrawal(
      &self.assets,
      &self.guard,
      asset,
      amount,
      recipient,
      &before,
      |shares, slot| pool.calc_withdraw_one_coin(shares, slot),
    )?;

    let released = self.share_ledger().ensure_available(plan.shares_to_redeem)?;

    let received = match self.pool.remove_liquidity_one_coin(
      plan.shares_to_redeem,
      plan.slot,
      plan.min_asset_out,
    ) {
      Ok(received) => received,
      Err(err) => {
        warn!(error = %err, released, "single-coin redemption rejected, re-staking released shares");
        self.restake_after_failed_burn(released);
        return Err(err);
      }
    };

    let to_recipient = received.min(amount);
    let dust = received - to_recipient;
    let mut failure = None;
    let (paid, mut to_vault) = match self.custody.push_to(asset, recipient, to_recipient) {
      Ok(()) => (to_recipient, dust),
      Err(err) => {
        warn!(recipient = %recipient, error = %err, "recipient transfer failed, forwarding proceeds to vault");
        failure = Some(err);
        (0, received)
      }
    };
    if to_vault > 0 {
      if let Err(err) = self.custody.push_to(asset, &self.vault, to_vault) {
        warn!(amount = to_vault, error = %err, "vault transfer failed, coin stays with the strategy");
        failure = failure.or(Some(err));
        to_vault = 0;
      }
    }

    let after = self.ledger()?;
    assert_ledger_conserved(&before, 0, plan.shares_to_redeem, &after)?;

    info!(
      asset = %asset,
      recipient = %recipient,
      requested = amount,
      shares_burned = plan.shares_to_redeem,
      shares_from_stake = plan.shares_from_stake,
      received,
      paid,
      to_vault,
      "withdrawal complete"
    );
    StrategyEvent::Withdrawn {
      asset: *asset,
      recipient: *recipient,
      requested: amount,
      shares_burned: plan.shares_to_redeem,
      received,
      to_recipient: paid,
      dust_to_vault: to_vault,
    }
    .emit();

    match failure {
      Some(err) => Err(StrategyError::WithdrawalUndelivered {
        shares_burned: plan.shares_to_redeem,
        received,
        forwarded_to_vault: to_vault,
        reason: err.to_string(),
      }),
      None => Ok(paid),
    }
  }

  /// Redeem every owned share and forward all three coin balances to the vault
  ///
  /// # Returns
  /// Per-slot amounts forwarded to the vault. A coin that cannot be forwarded
  /// after the burn is left with the strategy and reported through
  /// `ForwardIncomplete`; the other slots are still forwarded.
  pub fn withdraw_all(&mut self) -> Result<[u128; N_COINS]> {
    let before = self.ledger()?;
    let snapshot = self.pool.snapshot()?;
    let plan = plan_withdraw_all(&self.guard, &before, &snapshot)?;

    let mut returned = [0u128; N_COINS];
    if !plan.is_empty() {
      let released = self.share_ledger().ensure_available(plan.shares)?;
      returned = match self.pool.remove_liquidity(plan.shares, plan.min_amounts) {
        Ok(out) => out,
        Err(err) => {
          warn!(error = %err, released, "full redemption rejected, re-staking released shares");
          self.restake_after_failed_burn(released);
          return Err(err);
        }
      };
    }

    let mut forwarded = [0u128; N_COINS];
    let mut stranded = [0u128; N_COINS];
    let mut failure = None;
    for asset in self.assets.iter() {
      let balance = match self.custody.balance_of(&asset.address) {
        Ok(balance) => balance,
        Err(err) => {
          warn!(asset = %asset.address, error = %err, "balance read failed, coin not forwarded");
          stranded[asset.slot] = returned[asset.slot];
          failure = failure.or(Some(err));
          continue;
        }
      };
      if balance == 0 {
        continue;
      }
      match self.custody.push_to(&asset.address, &self.vault, balance) {
        Ok(()) => forwarded[asset.slot] = balance,
        Err(err) => {
          warn!(asset = %asset.address, balance, error = %err, "vault transfer failed, coin stays with the strategy");
          stranded[asset.slot] = balance;
          failure = failure.or(Some(err));
        }
      }
    }

    let after = self.ledger()?;
    assert_ledger_conserved(&before, 0, plan.shares, &after)?;

    info!(shares_burned = plan.shares, forwarded = ?forwarded, "withdraw-all complete");
    StrategyEvent::WithdrawnAll { shares_burned: plan.shares, forwarded }.emit();

    match failure {
      Some(err) => Err(StrategyError::ForwardIncomplete {
        shares_burned: plan.shares,
        stranded,
        reason: err.to_string(),
      }),
      None => Ok(forwarded),
    }
  }
}
