/// Configuration schema
///
/// Every section is declared with `config_struct!`, so any field missing from
/// the TOML file takes the default written here.
use crate::config_struct;

// ============================================================================
// EXCHANGES
// ============================================================================

config_struct! {
    /// Exchange adapter and transport settings
    pub struct ExchangesConfig {
        /// Per-request timeout applied by every adapter
        timeout_seconds: u64 = 10,
        /// Size of the shared transport pool (concurrent in-flight requests)
        max_concurrent_requests: usize = 12,
        /// Default deadline for one aggregate call (0 = wait for every adapter)
        aggregate_deadline_ms: u64 = 0,
        /// Venues to query; disabled venues are still reported as absent
        enabled: Vec<String> = vec![
            "binance".to_string(),
            "coinbase".to_string(),
            "kraken".to_string(),
            "kucoin".to_string(),
            "okx".to_string(),
            "bybit".to_string(),
        ],
    }
}

// ============================================================================
// CACHE
// ============================================================================

config_struct! {
    /// Two-tier cache settings
    pub struct CacheSettings {
        /// Maximum entries held by the process-local tier (LRU beyond this)
        local_capacity: usize = 5000,
        volume_ttl_secs: u64 = 60,
        price_ttl_secs: u64 = 60,
        historical_ttl_secs: u64 = 600,
        sentiment_ttl_secs: u64 = 300,
        /// Enable the SQLite shared tier
        shared_enabled: bool = false,
        shared_path: String = "data/shared_cache.db".to_string(),
    }
}

// ============================================================================
// INDICATORS
// ============================================================================

config_struct! {
    /// Default indicator parameters (callers may override per request)
    pub struct IndicatorConfig {
        rsi_period: usize = 14,
        macd_fast: usize = 12,
        macd_slow: usize = 26,
        macd_signal: usize = 9,
        spike_threshold: f64 = 20.0,
        arbitrage_min_spread_pct: f64 = 0.5,
    }
}

// ============================================================================
// SENTIMENT
// ============================================================================

config_struct! {
    /// Sentiment composer settings
    pub struct SentimentConfig {
        /// Venue whose daily candles feed RSI/MACD and the volume ratio
        reference_exchange: String = "binance".to_string(),
        history_days: u32 = 30,
        /// Periods averaged for the recent-vs-baseline volume ratio
        volume_lookback: usize = 3,
        news_enabled: bool = true,
        social_enabled: bool = true,
        source_timeout_seconds: u64 = 10,
    }
}

// ============================================================================
// LOGGING
// ============================================================================

config_struct! {
    pub struct LoggingConfig {
        min_level: String = "info".to_string(),
        file_enabled: bool = false,
        file_path: String = "logs/crypto-volume.log".to_string(),
    }
}

// ============================================================================
// ROOT
// ============================================================================

config_struct! {
    /// Root configuration
    pub struct Config {
        exchanges: ExchangesConfig = ExchangesConfig::default(),
        cache: CacheSettings = CacheSettings::default(),
        indicators: IndicatorConfig = IndicatorConfig::default(),
        sentiment: SentimentConfig = SentimentConfig::default(),
        logging: LoggingConfig = LoggingConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [exchanges]
            timeout_seconds = 3

            [indicators]
            spike_threshold = 5.0
            "#,
        )
        .unwrap();

        assert_eq!(config.exchanges.timeout_seconds, 3);
        assert_eq!(config.exchanges.max_concurrent_requests, 12);
        assert_eq!(config.exchanges.enabled.len(), 6);
        assert_eq!(config.indicators.spike_threshold, 5.0);
        assert_eq!(config.indicators.rsi_period, 14);
        assert_eq!(config.cache.volume_ttl_secs, 60);
        assert_eq!(config.sentiment.reference_exchange, "binance");
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.sentiment.history_days, 30);
        assert!(!config.cache.shared_enabled);
    }
}
