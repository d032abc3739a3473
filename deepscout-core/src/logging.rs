//! Tracing bootstrap for binaries and transport embedders.

use tracing_subscriber::EnvFilter;

/// Initialize the process-wide tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured level is used. Safe to
/// call more than once; later calls are ignored.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
