//! Logging configuration for dq-pulse.

use tracing_subscriber::EnvFilter;

/// Initializes logging to stderr.
///
/// Stdout is reserved for command output (scalar values, batch summaries,
/// metric expositions), so logs go to stderr where they can be captured or
/// discarded independently. Filtering via `RUST_LOG`, default `info`.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
