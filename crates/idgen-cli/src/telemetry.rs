//! Log output for the `idgen` binary.
//!
//! Events are written to stderr so stdout carries nothing but identifiers.
//! Verbosity follows `RUST_LOG` (e.g. `RUST_LOG=idgen=trace` shows every
//! producer starting and stopping) and defaults to `info`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init()?;

    Ok(())
}
