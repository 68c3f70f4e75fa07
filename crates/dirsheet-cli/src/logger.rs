//! Log output for the command line
//!
//! The library crates log through the `log` facade; the subscriber installed
//! here picks those records up and writes them to stderr.

use tracing_subscriber::EnvFilter;

/// Filter directive for the `-v`/`-q` flags
pub fn directive_for(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the stderr subscriber; `RUST_LOG` takes precedence over the flags
pub fn init(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| directive_for(verbose, quiet).into());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose > 1)
        .without_time()
        .try_init();
}
