//! Logging setup on top of `tracing-subscriber`.
//!
//! `RUST_LOG` wins when set (e.g. `RUST_LOG=ozh_covid=trace`); otherwise the
//! level picked on the command line is used. Logs go to stderr so report
//! output on stdout stays clean.

use tracing_subscriber::{EnvFilter, fmt};

pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A subscriber may already be installed when the library is embedded.
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

/// Verbose logging routed through the test harness's captured output.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
