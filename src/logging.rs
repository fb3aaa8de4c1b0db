/// Tracing subscriber setup
///
/// Libraries embedding a fault barrier usually install their own subscriber.
/// This helper is for binaries, tests and benchmarks that just want the
/// barrier's notifications on stderr.
use crate::settings::Severity;
use crate::{BarrierError, BarrierResult};
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber
///
/// `RUST_LOG` takes precedence; `fallback` is used when it is unset or does
/// not parse. Fails if a global subscriber is already installed.
pub fn init_subscriber(fallback: Severity) -> BarrierResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(fallback.as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| BarrierError::Logging(e.to_string()))
}
