//! Argument definitions and drivers for the command-line tools in `src/bin`.
//!
//! Each tool parses its arguments fully (clap rejects missing or conflicting
//! flags) before touching any file.

pub mod accumulate;
pub mod check;
pub mod convert;

use tracing_subscriber::EnvFilter;

/// Installs the stderr log subscriber. `RUST_LOG` overrides the default level.
/// Call once per process.
pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
