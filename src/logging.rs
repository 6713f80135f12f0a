//! Log subscriber setup
//!
//! Reports go to the caller's writer; logs and diagnostics go to stderr so the
//! two streams never interleave.

use tracing_subscriber::EnvFilter;

/// Environment variable checked before `RUST_LOG`.
pub const LOG_ENV: &str = "HEATLINK_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

/// Filter from `HEATLINK_LOG`, then `RUST_LOG`, then `warn`.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install a stderr `fmt` subscriber.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
