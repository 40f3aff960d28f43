//! Diagnostics for the `taxcalc` CLI.
//!
//! Computed figures are the CLI's only stdout output, so scripts can read
//! them directly. Trace events go to stderr and stay quiet unless
//! `RUST_LOG` asks for them. The HTTP server installs its own subscriber
//! and does not call [`init`].

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Directive used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "warn";

/// Build the filter from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
pub fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the stderr subscriber. Call once, before any work.
///
/// ```bash
/// RUST_LOG=taxcalc=debug taxcalc compute 10000
/// ```
pub fn init() {
    tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
