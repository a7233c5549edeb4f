//! Logging utilities
//!
//! Provides logging setup for the command line client.

use env_logger::Env;

/// Setup logging. `RUST_LOG` wins; otherwise `info`, or `debug` when verbose.
pub fn setup_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}
