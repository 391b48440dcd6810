//! Tracing setup
//!
//! Logs go to stderr so stdout stays clean for prompts and the progress
//! bar. `RUST_LOG` wins over the `--debug` flag when set.

use tracing_subscriber::EnvFilter;

pub fn init(debug: bool) {
    let default = if debug { "romflash=debug,debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}
