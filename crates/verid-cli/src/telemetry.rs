use tracing_subscriber::{EnvFilter, fmt};

/// Initializes structured logging using `tracing-subscriber`.
///
/// Logs go to stderr so that stdout carries only identifiers and reports.
/// The filter comes from `RUST_LOG` and defaults to `warn`.
pub fn init_tracing() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}
