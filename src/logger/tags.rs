/// Log tags identify the component a message comes from
use colored::*;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Cache,
    Exchange,
    Aggregator,
    Indicators,
    Sentiment,
    Api,
    Test,
    Other(String),
}

impl LogTag {
    /// Key used by --debug-<key> / --verbose-<key> flags
    pub fn to_debug_key(&self) -> String {
        match self {
            LogTag::System => "system".to_string(),
            LogTag::Config => "config".to_string(),
            LogTag::Cache => "cache".to_string(),
            LogTag::Exchange => "exchange".to_string(),
            LogTag::Aggregator => "aggregator".to_string(),
            LogTag::Indicators => "indicators".to_string(),
            LogTag::Sentiment => "sentiment".to_string(),
            LogTag::Api => "api".to_string(),
            LogTag::Test => "test".to_string(),
            LogTag::Other(name) => name.to_lowercase(),
        }
    }

    /// Uncolored label for the file sink
    pub fn to_plain_string(&self) -> String {
        match self {
            LogTag::System => "SYSTEM".to_string(),
            LogTag::Config => "CONFIG".to_string(),
            LogTag::Cache => "CACHE".to_string(),
            LogTag::Exchange => "EXCHANGE".to_string(),
            LogTag::Aggregator => "AGGREG".to_string(),
            LogTag::Indicators => "INDICATOR".to_string(),
            LogTag::Sentiment => "SENTIMENT".to_string(),
            LogTag::Api => "API".to_string(),
            LogTag::Test => "TEST".to_string(),
            LogTag::Other(name) => name.to_uppercase(),
        }
    }

    pub(super) fn colorize(&self, padded: String) -> ColoredString {
        match self {
            LogTag::System => padded.bright_yellow().bold(),
            LogTag::Config => padded.bright_white().bold(),
            LogTag::Cache => padded.bright_cyan().bold(),
            LogTag::Exchange => padded.bright_blue().bold(),
            LogTag::Aggregator => padded.bright_green().bold(),
            LogTag::Indicators => padded.bright_magenta().bold(),
            LogTag::Sentiment => padded.bright_yellow().bold(),
            LogTag::Api => padded.bright_purple().bold(),
            LogTag::Test => padded.bright_blue().bold(),
            LogTag::Other(_) => padded.white().bold(),
        }
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_plain_string())
    }
}
