/// Multi-exchange fan-out / fan-in
///
/// Every aggregate call spawns one task per enabled adapter into a `JoinSet`
/// and joins them all before returning. The result always holds one entry per
/// known exchange: failed, disabled and timed-out venues are reported
/// absent/empty. An optional deadline aborts the stragglers, and dropping the
/// aggregate future aborts every in-flight task with it.
pub mod arbitrage;
pub mod types;

pub use arbitrage::find_arbitrage;
pub use types::{
    complete_exchange_map, exchange_map_filled, ArbitrageOpportunity, ExchangeMap,
    HistoricalSeries, MarketSnapshot,
};

use crate::apis::adapter::ExchangeAdapter;
use crate::apis::stats::ApiStats;
use crate::apis::symbols::canonical_ticker;
use crate::apis::types::{DailyCandle, Exchange, Ticker};
use crate::cache::{CacheTtls, TwoTierCache};
use crate::config::Config;
use crate::logger::{self, LogTag};
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

#[derive(Debug, Clone)]
pub struct AggregatorSettings {
    /// Default deadline for aggregate calls; `None` waits for every adapter
    pub deadline: Option<Duration>,
    pub ttls: CacheTtls,
    pub arbitrage_min_spread_pct: f64,
}

impl AggregatorSettings {
    pub fn from_config(config: &Config) -> Self {
        let deadline_ms = config.exchanges.aggregate_deadline_ms;
        Self {
            deadline: (deadline_ms > 0).then(|| Duration::from_millis(deadline_ms)),
            ttls: CacheTtls::from(&config.cache),
            arbitrage_min_spread_pct: config.indicators.arbitrage_min_spread_pct,
        }
    }
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Fan-out result; `complete` is false when a deadline cut stragglers off
struct FanOut<T> {
    results: ExchangeMap<T>,
    complete: bool,
}

pub struct MarketAggregator {
    adapters: Vec<Arc<dyn ExchangeAdapter>>,
    cache: Arc<TwoTierCache>,
    settings: AggregatorSettings,
}

impl MarketAggregator {
    pub fn new(
        adapters: Vec<Arc<dyn ExchangeAdapter>>,
        cache: Arc<TwoTierCache>,
        settings: AggregatorSettings,
    ) -> Self {
        Self {
            adapters,
            cache,
            settings,
        }
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }

    pub fn cache(&self) -> &Arc<TwoTierCache> {
        &self.cache
    }

    pub fn enabled_exchanges(&self) -> Vec<Exchange> {
        self.adapters.iter().map(|a| a.exchange()).collect()
    }

    pub fn adapter(&self, exchange: Exchange) -> Option<&Arc<dyn ExchangeAdapter>> {
        self.adapters.iter().find(|a| a.exchange() == exchange)
    }

    // ========================================================================
    // VOLUMES / PRICES
    // ========================================================================

    /// 24h volume per exchange (six entries, value or absent)
    pub async fn fetch_all_volumes(&self, symbol: &str) -> ExchangeMap<Option<f64>> {
        self.fetch_all_volumes_with_deadline(symbol, self.settings.deadline)
            .await
    }

    pub async fn fetch_all_volumes_with_deadline(
        &self,
        symbol: &str,
        deadline: Option<Duration>,
    ) -> ExchangeMap<Option<f64>> {
        let ticker = canonical_ticker(symbol);
        let key = format!("volumes:{}", ticker);
        self.cached_absent_map(&key, self.settings.ttls.volume, || {
            self.fan_out("volumes", &ticker, deadline, None, |adapter, symbol| async move {
                adapter.fetch_volume(&symbol).await
            })
        })
        .await
    }

    /// Last price per exchange (six entries, value or absent)
    pub async fn fetch_all_prices(&self, symbol: &str) -> ExchangeMap<Option<f64>> {
        self.fetch_all_prices_with_deadline(symbol, self.settings.deadline)
            .await
    }

    pub async fn fetch_all_prices_with_deadline(
        &self,
        symbol: &str,
        deadline: Option<Duration>,
    ) -> ExchangeMap<Option<f64>> {
        let ticker = canonical_ticker(symbol);
        let key = format!("prices:{}", ticker);
        self.cached_absent_map(&key, self.settings.ttls.price, || {
            self.fan_out("prices", &ticker, deadline, None, |adapter, symbol| async move {
                adapter.fetch_price(&symbol).await
            })
        })
        .await
    }

    /// Volumes and prices from a single ticker request per venue
    pub async fn fetch_snapshot(&self, symbol: &str) -> MarketSnapshot {
        self.fetch_snapshot_with_deadline(symbol, self.settings.deadline)
            .await
    }

    pub async fn fetch_snapshot_with_deadline(
        &self,
        symbol: &str,
        deadline: Option<Duration>,
    ) -> MarketSnapshot {
        let ticker = canonical_ticker(symbol);
        let FanOut {
            results: tickers,
            complete,
        }: FanOut<Option<Ticker>> = self
            .fan_out("snapshot", &ticker, deadline, None, |adapter, symbol| async move {
                match adapter.fetch_ticker(&symbol).await {
                    Ok(quote) => Some(quote),
                    Err(e) => {
                        adapter.report_unavailable(&symbol, "ticker", &e).await;
                        None
                    }
                }
            })
            .await;

        let volumes: ExchangeMap<Option<f64>> = tickers
            .iter()
            .map(|(exchange, quote)| (*exchange, quote.map(|q| q.quote_volume)))
            .collect();
        let prices: ExchangeMap<Option<f64>> = tickers
            .iter()
            .map(|(exchange, quote)| (*exchange, quote.map(|q| q.last_price)))
            .collect();

        if complete && volumes.values().any(Option::is_some) {
            self.cache.set(
                &format!("volumes:{}", ticker),
                &volumes,
                self.settings.ttls.volume,
            );
            self.cache.set(
                &format!("prices:{}", ticker),
                &prices,
                self.settings.ttls.price,
            );
        }

        MarketSnapshot {
            symbol: ticker,
            volumes,
            prices,
            captured_at: Utc::now(),
        }
    }

    // ========================================================================
    // HISTORICAL
    // ========================================================================

    /// Daily volume series per exchange (six entries, empty on failure)
    pub async fn fetch_all_historical(&self, symbol: &str, days: u32) -> ExchangeMap<Vec<f64>> {
        self.fetch_all_historical_series(symbol, days)
            .await
            .into_iter()
            .map(|(exchange, series)| (exchange, series.volumes()))
            .collect()
    }

    pub async fn fetch_all_historical_series(
        &self,
        symbol: &str,
        days: u32,
    ) -> ExchangeMap<HistoricalSeries> {
        self.fetch_all_historical_series_with_deadline(symbol, days, self.settings.deadline)
            .await
    }

    pub async fn fetch_all_historical_series_with_deadline(
        &self,
        symbol: &str,
        days: u32,
        deadline: Option<Duration>,
    ) -> ExchangeMap<HistoricalSeries> {
        let ticker = canonical_ticker(symbol);
        let key = format!("historical:{}:{}", ticker, days);

        if let Some(cached) = self.cache.get::<ExchangeMap<HistoricalSeries>>(&key) {
            return self.complete_series(cached, &ticker, days);
        }

        let FanOut {
            results: candles,
            complete,
        }: FanOut<Vec<DailyCandle>> = self
            .fan_out("historical", &ticker, deadline, Vec::new(), move |adapter, symbol| async move {
                adapter.fetch_candles(&symbol, days).await
            })
            .await;

        let series: ExchangeMap<HistoricalSeries> = candles
            .into_iter()
            .map(|(exchange, candles)| {
                (
                    exchange,
                    HistoricalSeries {
                        symbol: ticker.clone(),
                        exchange,
                        days,
                        candles,
                    },
                )
            })
            .collect();

        if complete && series.values().any(|s| !s.is_empty()) {
            self.cache.set(&key, &series, self.settings.ttls.historical);
        }
        series
    }

    /// Daily candles of one venue; empty when disabled or unavailable
    pub async fn fetch_candles(&self, exchange: Exchange, symbol: &str, days: u32) -> Vec<DailyCandle> {
        let Some(adapter) = self.adapter(exchange) else {
            logger::debug(
                LogTag::Aggregator,
                &format!("{} is not enabled, no candles for {}", exchange, symbol),
            );
            return Vec::new();
        };

        let ticker = canonical_ticker(symbol);
        let key = format!("candles:{}:{}:{}", exchange, ticker, days);
        if let Some(cached) = self.cache.get::<Vec<DailyCandle>>(&key) {
            return cached;
        }

        let candles = adapter.fetch_candles(&ticker, days).await;
        if !candles.is_empty() {
            self.cache.set(&key, &candles, self.settings.ttls.historical);
        }
        candles
    }

    // ========================================================================
    // DERIVED
    // ========================================================================

    pub async fn detect_arbitrage(&self, symbol: &str) -> Vec<ArbitrageOpportunity> {
        let prices = self.fetch_all_prices(symbol).await;
        find_arbitrage(&prices, self.settings.arbitrage_min_spread_pct)
    }

    /// Request statistics of every enabled adapter
    pub async fn get_all_stats(&self) -> ExchangeMap<ApiStats> {
        let mut stats = ExchangeMap::new();
        for adapter in &self.adapters {
            stats.insert(adapter.exchange(), adapter.get_stats().await);
        }
        stats
    }

    // ========================================================================
    // FAN-OUT CORE
    // ========================================================================

    async fn cached_absent_map<F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> ExchangeMap<Option<f64>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FanOut<Option<f64>>>,
    {
        if let Some(cached) = self.cache.get::<ExchangeMap<Option<f64>>>(key) {
            logger::debug(LogTag::Aggregator, &format!("Cache hit for {}", key));
            return complete_exchange_map(cached, None);
        }

        let FanOut { results, complete } = fetch().await;
        if !complete {
            logger::debug(
                LogTag::Aggregator,
                &format!("Not caching {}: deadline cut the fan-out short", key),
            );
        } else if results.values().any(Option::is_some) {
            self.cache.set(key, &results, ttl);
        }
        results
    }

    fn complete_series(
        &self,
        mut cached: ExchangeMap<HistoricalSeries>,
        ticker: &str,
        days: u32,
    ) -> ExchangeMap<HistoricalSeries> {
        for exchange in Exchange::ALL {
            cached
                .entry(exchange)
                .or_insert_with(|| HistoricalSeries::empty(ticker, exchange, days));
        }
        cached
    }

    /// Run `op` on every enabled adapter concurrently and collect one entry
    /// per known exchange. Entries default to `absent` and are only replaced
    /// by tasks that finish in time.
    /// `complete` is false when the deadline aborted tasks.
    async fn fan_out<T, F, Fut>(
        &self,
        operation: &str,
        ticker: &str,
        deadline: Option<Duration>,
        absent: T,
        op: F,
    ) -> FanOut<T>
    where
        T: Clone + Send + 'static,
        F: Fn(Arc<dyn ExchangeAdapter>, String) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let mut results = exchange_map_filled(absent);

        if ticker.is_empty() {
            logger::warning(
                LogTag::Aggregator,
                &format!("Empty symbol for {}, every exchange reported absent", operation),
            );
            return FanOut {
                results,
                complete: true,
            };
        }

        let start = Instant::now();
        let mut tasks = JoinSet::new();
        for adapter in &self.adapters {
            let exchange = adapter.exchange();
            let work = op(adapter.clone(), ticker.to_string());
            tasks.spawn(async move { (exchange, work.await) });
        }

        let gather = async {
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((exchange, value)) => {
                        results.insert(exchange, value);
                    }
                    Err(e) => {
                        logger::warning(
                            LogTag::Aggregator,
                            &format!("{} task for {} failed: {}", operation, ticker, e),
                        );
                    }
                }
            }
        };

        let mut complete = true;
        match deadline {
            Some(limit) => {
                if tokio::time::timeout(limit, gather).await.is_err() {
                    complete = false;
                    logger::warning(
                        LogTag::Aggregator,
                        &format!(
                            "{} for {} hit the {}ms deadline, aborting {} pending exchange call(s)",
                            operation,
                            ticker,
                            limit.as_millis(),
                            tasks.len()
                        ),
                    );
                    tasks.abort_all();
                }
            }
            None => gather.await,
        }

        logger::debug(
            LogTag::Aggregator,
            &format!(
                "{} for {} joined {} exchange(s) in {}ms",
                operation,
                ticker,
                self.adapters.len(),
                start.elapsed().as_millis()
            ),
        );

        FanOut { results, complete }
    }
}
