//! Tracing setup for the server binary.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Directives used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_DIRECTIVES: &str = "info,memory_duel=debug,tower_http=info";

/// Install the global subscriber: compact fmt output filtered by `RUST_LOG`,
/// e.g. `RUST_LOG=memory_duel=trace,tower_http=debug`.
pub fn init() -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(true))
        .try_init()
}
