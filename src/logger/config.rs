/// Runtime logger configuration
///
/// Populated once from command-line flags by `init_from_args`:
/// - `--debug-<tag>`   enable Debug level for one tag
/// - `--verbose-<tag>` enable Verbose level for one tag
/// - `--verbose`       enable Verbose level for every tag
/// - `--quiet`         only show errors
use super::levels::LogLevel;
use super::tags::LogTag;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    pub debug_tags: HashSet<String>,
    pub verbose_tags: HashSet<String>,
    /// Empty set means every tag is enabled
    pub enabled_tags: HashSet<String>,
    /// Global --verbose; also opens Debug output for every tag
    pub verbose_all: bool,
    /// The threshold was chosen by a command-line flag
    pub level_from_flags: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            verbose_tags: HashSet::new(),
            enabled_tags: HashSet::new(),
            verbose_all: false,
            level_from_flags: false,
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG.read().clone()
}

pub fn set_logger_config(config: LoggerConfig) {
    *LOGGER_CONFIG.write() = config;
}

/// Scan process arguments for debug/verbose/quiet flags
pub fn init_from_args() {
    let args: Vec<String> = std::env::args().collect();
    set_logger_config(parse_flags(&args));
}

fn parse_flags(args: &[String]) -> LoggerConfig {
    let mut config = LoggerConfig::default();

    for arg in args {
        if arg == "--verbose" {
            config.min_level = LogLevel::Verbose;
            config.verbose_all = true;
            config.level_from_flags = true;
        } else if arg == "--quiet" {
            config.min_level = LogLevel::Error;
            config.level_from_flags = true;
        } else if let Some(tag) = arg.strip_prefix("--debug-") {
            config.debug_tags.insert(tag.to_lowercase());
        } else if let Some(tag) = arg.strip_prefix("--verbose-") {
            config.verbose_tags.insert(tag.to_lowercase());
        }
    }

    lift_for_tags(&mut config);
    config
}

/// Per-tag debug needs the threshold lifted to Debug
fn lift_for_tags(config: &mut LoggerConfig) {
    if !config.debug_tags.is_empty() && config.min_level < LogLevel::Debug {
        config.min_level = LogLevel::Debug;
        config.level_from_flags = true;
    }
    if !config.verbose_tags.is_empty() && config.min_level < LogLevel::Verbose {
        config.min_level = LogLevel::Verbose;
        config.level_from_flags = true;
    }
}

/// Fold the `[logging] min_level` setting into flag-derived state.
/// Flags win: the file level only applies when no flag picked a threshold.
pub fn merge_file_level(mut config: LoggerConfig, file_level: Option<LogLevel>) -> LoggerConfig {
    if config.level_from_flags {
        return config;
    }
    if let Some(level) = file_level {
        config.min_level = level;
    }
    lift_for_tags(&mut config);
    config
}

pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    debug_enabled_in(&LOGGER_CONFIG.read(), tag)
}

pub fn is_verbose_enabled_for_tag(tag: &LogTag) -> bool {
    verbose_enabled_in(&LOGGER_CONFIG.read(), tag)
}

pub(super) fn debug_enabled_in(config: &LoggerConfig, tag: &LogTag) -> bool {
    let key = tag.to_debug_key();
    config.verbose_all || config.debug_tags.contains(&key) || config.verbose_tags.contains(&key)
}

pub(super) fn verbose_enabled_in(config: &LoggerConfig, tag: &LogTag) -> bool {
    config.verbose_all || config.verbose_tags.contains(&tag.to_debug_key())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(flags: &[&str]) -> Vec<String> {
        std::iter::once("bin")
            .chain(flags.iter().copied())
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_file_level_does_not_override_debug_flag() {
        let merged = merge_file_level(parse_flags(&args(&["--debug-cache"])), Some(LogLevel::Info));
        assert_eq!(merged.min_level, LogLevel::Debug);
        assert!(debug_enabled_in(&merged, &LogTag::Cache));
        assert!(!debug_enabled_in(&merged, &LogTag::Exchange));
    }

    #[test]
    fn test_file_level_does_not_undo_quiet() {
        let merged = merge_file_level(parse_flags(&args(&["--quiet"])), Some(LogLevel::Info));
        assert_eq!(merged.min_level, LogLevel::Error);
    }

    #[test]
    fn test_file_level_applies_without_flags() {
        let merged = merge_file_level(parse_flags(&args(&[])), Some(LogLevel::Warning));
        assert_eq!(merged.min_level, LogLevel::Warning);

        let unparsable = merge_file_level(parse_flags(&args(&[])), None);
        assert_eq!(unparsable.min_level, LogLevel::Info);
    }

    #[test]
    fn test_global_verbose_enables_debug_for_every_tag() {
        let config = parse_flags(&args(&["--verbose"]));
        assert!(config.verbose_all);
        assert!(debug_enabled_in(&config, &LogTag::Aggregator));
        assert!(verbose_enabled_in(&config, &LogTag::Sentiment));
    }

    #[test]
    fn test_parse_flags() {
        let args: Vec<String> = ["bin", "--debug-cache", "--debug-Exchange"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let config = parse_flags(&args);
        assert!(config.debug_tags.contains("cache"));
        assert!(config.debug_tags.contains("exchange"));
        assert_eq!(config.min_level, LogLevel::Debug);

        let quiet = parse_flags(&["bin".to_string(), "--quiet".to_string()]);
        assert_eq!(quiet.min_level, LogLevel::Error);
    }
}
