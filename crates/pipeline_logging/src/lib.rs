#![deny(missing_docs)]
//! Shared logging utilities for the page extraction workspace.
//!
//! This crate provides the `pipeline_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger.

#[doc(hidden)]
pub use log;

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! pipeline_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! pipeline_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! pipeline_info {
    ($($arg:tt)*) => {{
        $crate::log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! pipeline_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! pipeline_error {
    ($($arg:tt)*) => {{
        $crate::log::error!($($arg)*);
    }};
}

pub use log::LevelFilter;

/// Crates whose records the test logger lets through; wiremock, hyper and
/// reqwest chatter is dropped.
const TEST_LOG_TARGETS: &[&str] = &["page_engine", "page_cli", "pipeline_logging"];

/// Environment variable read by [`test_level_from_env`].
pub const TEST_LOG_ENV: &str = "PAGE_EXTRACT_TEST_LOG";

/// Reads the test log level from [`TEST_LOG_ENV`] (`off`, `error`, ... `trace`),
/// falling back to `fallback` when unset or unparsable.
pub fn test_level_from_env(fallback: LevelFilter) -> LevelFilter {
    std::env::var(TEST_LOG_ENV)
        .ok()
        .and_then(|raw| parse_level(&raw))
        .unwrap_or(fallback)
}

fn parse_level(raw: &str) -> Option<LevelFilter> {
    raw.trim().parse().ok()
}

/// Initializes a stderr logger at `level` for tests, limited to the pipeline
/// crates.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests(level: LevelFilter) {
    use simplelog::{ColorChoice, CombinedLogger, ConfigBuilder, TermLogger, TerminalMode};

    let mut builder = ConfigBuilder::new();
    for &target in TEST_LOG_TARGETS {
        builder.add_filter_allow_str(target);
    }

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        builder.build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )]);
}
