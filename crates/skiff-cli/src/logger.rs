//! Logging for the Skiff CLI.
//!
//! stdout carries exactly one JSON envelope, so every log line goes to
//! stderr.
//!
//! The level is chosen in this order:
//! 1. `--verbose`: DEBUG for skiff crates
//! 2. `--quiet`: ERROR only
//! 3. `RUST_LOG`
//! 4. INFO for skiff crates

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "skiff_cli=debug,skiff_vfs=debug,skiff_bundler=debug,skiff_check=debug";
const QUIET_FILTER: &str = "error";
const DEFAULT_FILTER: &str = "skiff_cli=info,skiff_bundler=info,skiff_check=info";

/// The filter for a combination of flags.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(fmt_layer)
        .init();
}
