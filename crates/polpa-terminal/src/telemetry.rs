//! # Telemetry
//!
//! Structured logging setup for terminal hosts.
//!
//! All polpa crates log through `tracing`; nothing reaches stderr until the
//! embedding shell installs a subscriber. [`init_tracing`] installs the
//! standard one.

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - show debug messages from everything
/// - `RUST_LOG=polpa=trace` - trace for the polpa crates only
/// - Default: `info`, plus debug for the polpa crates, warnings from sqlx
///
/// Call once at host startup. The global subscriber can only be set once;
/// a second call panics.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,polpa=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
