//! Subscriber setup for host processes.
//!
//! Events go to stderr; stdout belongs to the host handshake.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber with `default` as fallback filter.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn try_init_logging(default: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(filter(default))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(true)
                .compact(),
        )
        .try_init()
}

/// Install the global subscriber at [`DEFAULT_FILTER`], keeping any existing one.
pub fn init_logging() {
    // A subscriber installed by the embedding process wins.
    let _ = try_init_logging(DEFAULT_FILTER);
}
