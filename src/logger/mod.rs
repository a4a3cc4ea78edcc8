//! Structured, tagged logging for the market-data core
//!
//! - Standard log levels (Error/Warning/Info/Debug/Verbose)
//! - Per-component debug control via --debug-<tag> flags
//! - Colored console output plus optional plain-text file sink
//!
//! ## Usage
//!
//! ```rust
//! use crypto_volume::logger::{self, LogTag};
//!
//! logger::warning(LogTag::Exchange, "kraken unavailable for XBT: HTTP 503");
//! logger::info(LogTag::Aggregator, "Fetched volumes for BTC");
//! logger::debug(LogTag::Cache, "Shared tier miss for volumes:BTC"); // Only if --debug-cache
//! ```
//!
//! ## Initialization
//!
//! Call once at startup, before any logging occurs:
//! ```rust
//! crypto_volume::logger::init();
//! ```

mod config;
mod core;
mod file;
mod format;
mod levels;
mod tags;

pub use config::{
    get_logger_config, init_from_args, is_debug_enabled_for_tag, is_verbose_enabled_for_tag,
    merge_file_level, set_logger_config, LoggerConfig,
};
pub use levels::LogLevel;
pub use tags::LogTag;

use crate::config::LoggingConfig;

/// Initialize the logger from command-line flags only (console output)
pub fn init() {
    config::init_from_args();
}

/// Initialize the logger from command-line flags and the `[logging]` config section
pub fn init_with(settings: &LoggingConfig) {
    config::init_from_args();
    set_logger_config(config::merge_file_level(
        get_logger_config(),
        LogLevel::from_str(&settings.min_level),
    ));

    if settings.file_enabled {
        file::init_file_logging(&settings.file_path);
    }
}

/// Log at ERROR level (always shown)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level (shown unless --quiet)
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level (only with --debug-<tag>)
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level (only with --verbose or --verbose-<tag>)
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}

/// Force flush pending file writes
pub fn flush() {
    file::flush_file_logging();
}
