//! Two-tier share ledger: shares held locally vs staked in the sink.
//! All tier moves go through here so the shortfall logic lives in one place.

use tracing::debug;

use tripool_core::invariants::{assert_local_covers, assert_shares_available};
use tripool_core::{LedgerState, Result};

use crate::events::StrategyEvent;
use crate::interfaces::{Pool, StakingSink};

pub struct ShareLedger<'a, P: ?Sized, S: ?Sized> {
  pool: &'a P,
  sink: &'a mut S,
}

impl<'a, P, S> ShareLedger<'a, P, S>
where
  P: Pool + ?Sized,
  S: StakingSink + ?Sized,
{
  pub fn new(pool: &'a P, sink: &'a mut S) -> Self {
    Self { pool, sink }
  }

  /// Current local, staked and total shares. No side effects.
  pub fn totals(&self) -> Result<LedgerState> {
    Self::read(self.pool, &*self.sink)
  }

  /// [`Self::totals`] without taking the sink mutably
  pub fn read(pool: &P, sink: &S) -> Result<LedgerState> {
    let local = pool.local_share_balance()?;
    let staked = sink.staked_balance()?;
    LedgerState::new(local, staked)
  }

  /// Make `required` shares burnable from local custody
  ///
  /// Releases `required - local` from the sink when local custody is short.
  /// Must succeed before any share-burning pool call.
  ///
  /// # Returns
  /// Shares released from the sink, or `InsufficientShares` if the strategy
  /// does not own `required` shares across both tiers
  pub fn ensure_available(&mut self, required: u128) -> Result<u128> {
    let ledger = self.totals()?;
    assert_shares_available(&ledger, required)?;

    let shortfall = ledger.shortfall(required);
    if shortfall == 0 {
      return Ok(0);
    }

    debug!(required, local = ledger.local, shortfall, "releasing shares from stake");
    self.sink.withdraw(shortfall)?;

    // a sink that under-delivers must fail the operation, not shrink the burn
    let after = self.totals()?;
    assert_local_covers(&after, required)?;

    StrategyEvent::Unstaked { shares: shortfall }.emit();
    Ok(shortfall)
  }

  /// Stake every local share
  ///
  /// # Returns
  /// Shares moved into the sink
  pub fn stake_all_local(&mut self) -> Result<u128> {
    let local = self.pool.local_share_balance()?;
    if local == 0 {
      return Ok(0);
    }

    let staked = self.sink.deposit_all_local_shares()?;
    if staked > 0 {
      StrategyEvent::Staked { shares: staked }.emit();
    }
    Ok(staked)
  }

  /// Return `shares` to the sink, leaving any other local shares where they are
  pub fn restake(&mut self, shares: u128) -> Result<()> {
    if shares == 0 {
      return Ok(());
    }
    self.sink.deposit(shares)?;
    StrategyEvent::Staked { shares }.emit();
    Ok(())
  }
}
