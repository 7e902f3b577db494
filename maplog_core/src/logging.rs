//! Tracing setup for the maplog binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default directives when RUST_LOG is unset
///
/// Quiet runs only report problems, since the CLI prints its own results.
/// `--verbose` opens up debug output for the maplog crates alone.
pub fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "warn,maplog_core=debug,maplog=debug"
    } else {
        "warn"
    }
}

fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)))
}

/// Install the global subscriber; events go to stderr so stdout stays clean
pub fn init(verbose: bool) {
    tracing_subscriber::registry()
        .with(filter(verbose))
        .with(fmt::layer().compact().with_target(verbose).with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
