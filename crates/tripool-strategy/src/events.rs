//! # Strategy Events
//!
//! Structured records of every ledger-changing operation, logged as
//! `EVENT_JSON:{...}` lines on the `tripool::events` tracing target.
//!
//! ```json
//! {"event":"deposited","amounts":[0,1000000000,0],"min_shares":...,"shares_minted":...,"total_shares":...}
//! ```

use serde::Serialize;
use tracing::{info, warn};

use tripool_core::constants::N_COINS;
use tripool_core::Address;

pub const EVENT_TARGET: &str = "tripool::events";

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
#[must_use = "don't forget to `.emit()` this event"]
pub enum StrategyEvent {
  Deposited {
    amounts: [u128; N_COINS],
    min_shares: u128,
    shares_minted: u128,
    total_shares: u128,
  },
  Withdrawn {
    asset: Address,
    recipient: Address,
    requested: u128,
    shares_burned: u128,
    received: u128,
    to_recipient: u128,
    dust_to_vault: u128,
  },
  WithdrawnAll {
    shares_burned: u128,
    forwarded: [u128; N_COINS],
  },
  Staked {
    shares: u128,
  },
  Unstaked {
    shares: u128,
  },
}

impl StrategyEvent {
  fn to_json_event_string(&self) -> Option<String> {
    serde_json::to_string(self)
      .ok()
      .map(|json| format!("EVENT_JSON:{json}"))
  }

  pub fn emit(self) {
    match self.to_json_event_string() {
      Some(line) => info!(target: EVENT_TARGET, "{line}"),
      None => warn!(target: EVENT_TARGET, event = ?self, "event failed to serialize"),
    }
  }
}
