use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. Safe to call more than once; later calls
/// are no-ops, which keeps embedding hosts and tests from fighting over it.
pub fn init() {
    let fmt_layer = fmt::layer().with_target(false);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("authgate=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .ok();
}
