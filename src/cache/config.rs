/// Cache configuration per entity type
///
/// TTLs tuned to how fast the underlying data moves:
/// - Volumes / prices: short TTL (24h tickers refresh continuously)
/// - Daily history: medium TTL (only the latest candle changes)
/// - Sentiment reports: medium TTL (headlines and votes move slowly)
use crate::config::CacheSettings;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Default time-to-live for entries inserted without an explicit TTL
    pub ttl: Duration,

    /// Maximum number of entries (LRU eviction when exceeded)
    pub capacity: usize,
}

impl CacheConfig {
    /// Process-local tier sized from the `[cache]` section
    pub fn local_tier(settings: &CacheSettings) -> Self {
        Self {
            ttl: Duration::from_secs(settings.volume_ttl_secs),
            capacity: settings.local_capacity.max(1),
        }
    }

    pub fn custom(ttl_secs: u64, capacity: usize) -> Self {
        Self {
            ttl: Duration::from_secs(ttl_secs),
            capacity,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::local_tier(&CacheSettings::default())
    }
}

/// TTLs applied by the aggregator and sentiment composer
#[derive(Debug, Clone, Copy)]
pub struct CacheTtls {
    pub volume: Duration,
    pub price: Duration,
    pub historical: Duration,
    pub sentiment: Duration,
}

impl From<&CacheSettings> for CacheTtls {
    fn from(settings: &CacheSettings) -> Self {
        Self {
            volume: Duration::from_secs(settings.volume_ttl_secs),
            price: Duration::from_secs(settings.price_ttl_secs),
            historical: Duration::from_secs(settings.historical_ttl_secs),
            sentiment: Duration::from_secs(settings.sentiment_ttl_secs),
        }
    }
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self::from(&CacheSettings::default())
    }
}
