/// Process-wide wiring of the market-data core
///
/// Built once at startup from `Config`: one transport pool, one two-tier
/// cache, the enabled exchange adapters, the aggregator, the reference-data
/// clients and the sentiment composer. Collaborators hold the service (or
/// clones of its `Arc`s) instead of reaching for globals.
use crate::aggregator::{AggregatorSettings, MarketAggregator};
use crate::apis::build_adapter;
use crate::apis::coingecko::CoinGeckoClient;
use crate::apis::cryptocompare::CryptoCompareClient;
use crate::apis::types::Exchange;
use crate::apis::{ExchangeAdapter, TransportPool};
use crate::cache::{CacheConfig, SharedStore, SqliteSharedStore, TwoTierCache};
use crate::config::{self, Config, ExchangesConfig};
use crate::indicators::IndicatorParams;
use crate::logger::{self, LogTag};
use crate::sentiment::{ComposerSettings, HeadlineSource, SentimentComposer, SocialSentimentSource};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

pub struct MarketDataService {
    config: Config,
    transport: Arc<TransportPool>,
    cache: Arc<TwoTierCache>,
    aggregator: Arc<MarketAggregator>,
    coingecko: Arc<CoinGeckoClient>,
    news: Arc<CryptoCompareClient>,
    composer: Arc<SentimentComposer>,
}

impl MarketDataService {
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = Arc::new(
            TransportPool::new(config.exchanges.max_concurrent_requests)
                .map_err(anyhow::Error::msg)
                .context("Failed to build transport pool")?,
        );

        let cache = Arc::new(build_cache(config)?);

        let adapter_timeout = Duration::from_secs(config.exchanges.timeout_seconds.max(1));
        let adapters: Vec<Arc<dyn ExchangeAdapter>> = enabled_exchanges(&config.exchanges)
            .into_iter()
            .map(|exchange| build_adapter(exchange, transport.clone(), adapter_timeout))
            .collect();

        let aggregator = Arc::new(MarketAggregator::new(
            adapters,
            cache.clone(),
            AggregatorSettings::from_config(config),
        ));

        let source_timeout = Duration::from_secs(config.sentiment.source_timeout_seconds.max(1));
        let coingecko = Arc::new(CoinGeckoClient::new(
            transport.clone(),
            source_timeout,
            config.sentiment.social_enabled,
        ));
        let news = Arc::new(CryptoCompareClient::new(
            transport.clone(),
            source_timeout,
            config.sentiment.news_enabled,
        ));

        let headline_source: Option<Arc<dyn HeadlineSource>> = if config.sentiment.news_enabled {
            Some(news.clone())
        } else {
            None
        };
        let social_source: Option<Arc<dyn SocialSentimentSource>> =
            if config.sentiment.social_enabled {
                Some(coingecko.clone())
            } else {
                None
            };

        let composer = Arc::new(SentimentComposer::new(
            aggregator.clone(),
            headline_source,
            social_source,
            cache.clone(),
            ComposerSettings::from_config(config),
        ));

        logger::info(
            LogTag::System,
            &format!(
                "Market data service ready: {} exchange(s), shared cache {}",
                aggregator.enabled_exchanges().len(),
                if cache.has_shared_tier() { "on" } else { "off" }
            ),
        );

        Ok(Self {
            config: config.clone(),
            transport,
            cache,
            aggregator,
            coingecko,
            news,
            composer,
        })
    }

    /// Load the configuration file, initialise logging and build the service
    pub fn from_global_config() -> Result<Self> {
        config::load_config()
            .map_err(anyhow::Error::msg)
            .context("Failed to load configuration")?;
        let config = config::get_config_clone();
        logger::init_with(&config.logging);
        Self::from_config(&config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &Arc<TransportPool> {
        &self.transport
    }

    pub fn cache(&self) -> &Arc<TwoTierCache> {
        &self.cache
    }

    pub fn aggregator(&self) -> &Arc<MarketAggregator> {
        &self.aggregator
    }

    pub fn coingecko(&self) -> &Arc<CoinGeckoClient> {
        &self.coingecko
    }

    pub fn news(&self) -> &Arc<CryptoCompareClient> {
        &self.news
    }

    pub fn composer(&self) -> &Arc<SentimentComposer> {
        &self.composer
    }

    pub fn indicator_params(&self) -> IndicatorParams {
        IndicatorParams::from(&self.config.indicators)
    }
}

fn build_cache(config: &Config) -> Result<TwoTierCache> {
    let local = CacheConfig::local_tier(&config.cache);
    if !config.cache.shared_enabled {
        return Ok(TwoTierCache::local_only(local));
    }

    let store = SqliteSharedStore::open(&config.cache.shared_path).with_context(|| {
        format!(
            "Failed to open shared cache at '{}'",
            config.cache.shared_path
        )
    })?;
    let store: Arc<dyn SharedStore> = Arc::new(store);
    Ok(TwoTierCache::with_shared(local, store))
}

/// Parse the configured venue names in canonical order, skipping unknown and duplicate names
pub fn enabled_exchanges(settings: &ExchangesConfig) -> Vec<Exchange> {
    let mut enabled = Vec::new();
    for name in &settings.enabled {
        match name.parse::<Exchange>() {
            Ok(exchange) => {
                if !enabled.contains(&exchange) {
                    enabled.push(exchange);
                }
            }
            Err(e) => logger::warning(LogTag::Config, &format!("{}, ignoring", e)),
        }
    }
    enabled.sort();
    enabled
}
