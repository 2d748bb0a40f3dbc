//! Logging setup shared by the binary and integration tests.
//!
//! All crates log through `tracing` macros; this module only installs the
//! subscriber. The filter starts from `RUST_LOG` and adds a `preloved=<level>`
//! directive, which covers every `preloved_*` target.

use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber at `INFO`.
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific level for the workspace crates.
///
/// Calling this more than once is harmless; later calls leave the first
/// subscriber in place.
pub fn init_with_level(level: Level) {
    let mut filter = EnvFilter::from_default_env();
    match format!("preloved={}", level).parse() {
        Ok(directive) => filter = filter.add_directive(directive),
        Err(e) => eprintln!("Invalid log directive for level {}: {}", level, e),
    }

    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_thread_names(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Log a result at `INFO` on success or `WARN` on failure and hand it back.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => warn!("{}: {}", error_context, e),
    }
    result
}
