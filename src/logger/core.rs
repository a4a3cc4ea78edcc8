/// Central filtering logic
use super::config::{debug_enabled_in, get_logger_config, verbose_enabled_in, LoggerConfig};
use super::levels::LogLevel;
use super::tags::LogTag;

/// Filtering rules:
/// 1. Errors are always shown
/// 2. Anything above the minimum level threshold is dropped
/// 3. Debug level requires --debug-<tag> for that tag, or a global --verbose
/// 4. Verbose requires --verbose or --verbose-<tag>
/// 5. If enabled_tags is non-empty, the tag must be in the set
pub fn should_log(tag: &LogTag, level: LogLevel) -> bool {
    passes_filter(&get_logger_config(), tag, level)
}

fn passes_filter(config: &LoggerConfig, tag: &LogTag, level: LogLevel) -> bool {
    if level == LogLevel::Error {
        return true;
    }

    if level > config.min_level {
        return false;
    }

    if level == LogLevel::Debug {
        return debug_enabled_in(config, tag);
    }

    if level == LogLevel::Verbose {
        return config.verbose_tags.is_empty() || verbose_enabled_in(config, tag);
    }

    if !config.enabled_tags.is_empty() && !config.enabled_tags.contains(&tag.to_debug_key()) {
        return false;
    }

    true
}

pub fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    if !should_log(&tag, level) {
        return;
    }

    super::format::format_and_log(&tag, level, message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_verbose_shows_debug_lines() {
        let config = LoggerConfig {
            min_level: LogLevel::Verbose,
            verbose_all: true,
            level_from_flags: true,
            ..LoggerConfig::default()
        };
        assert!(passes_filter(&config, &LogTag::Cache, LogLevel::Debug));
        assert!(passes_filter(&config, &LogTag::Cache, LogLevel::Verbose));
    }

    #[test]
    fn test_debug_requires_tag_flag() {
        let mut config = LoggerConfig {
            min_level: LogLevel::Debug,
            ..LoggerConfig::default()
        };
        config.debug_tags.insert("cache".to_string());
        assert!(passes_filter(&config, &LogTag::Cache, LogLevel::Debug));
        assert!(!passes_filter(&config, &LogTag::Exchange, LogLevel::Debug));
        assert!(passes_filter(&config, &LogTag::Exchange, LogLevel::Info));
    }

    #[test]
    fn test_quiet_keeps_errors_only() {
        let config = LoggerConfig {
            min_level: LogLevel::Error,
            ..LoggerConfig::default()
        };
        assert!(passes_filter(&config, &LogTag::Api, LogLevel::Error));
        assert!(!passes_filter(&config, &LogTag::Api, LogLevel::Warning));
    }
}
