//! Process-wide tracing setup shared by the binaries

use anyhow::{anyhow, Context};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber
///
/// `filter` is an `EnvFilter` directive such as `info` or
/// `tripool=debug,tripool::events=info`. Fails if the directive does not parse
/// or a global subscriber is already installed.
pub fn init(filter: &str) -> anyhow::Result<()> {
  let filter = EnvFilter::try_new(filter).with_context(|| format!("invalid log filter `{filter}`"))?;

  tracing_subscriber::registry()
    .with(filter)
    .with(fmt::layer().with_target(true))
    .try_init()
    .map_err(|e| anyhow!("tracing subscriber already installed: {e}"))?;

  tracing::debug!("telemetry initialised");
  Ok(())
}
