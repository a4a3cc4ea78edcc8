//! Sentiment composer
//!
//! Blends four signed components into one composite score:
//!
//! | component | value                                        | weight |
//! |-----------|----------------------------------------------|--------|
//! | news      | (positive - negative) / total headlines      | 0.3    |
//! | rsi       | +0.5 below 30, -0.5 above 70                 | 0.2    |
//! | macd      | +0.3 when macd > signal, else -0.3           | 0.2    |
//! | volume    | +0.4 above 1.5x baseline, -0.2 below 0.5x    | 0.3    |
//!
//! A component that cannot be computed contributes 0. The composite is
//! always within [-0.52, 0.58].

pub mod headlines;
pub mod types;

pub use headlines::{classify_headline, HeadlineSentiment, NewsBreakdown};
pub use types::{SentimentCategory, SentimentComponents, SentimentReport};

use crate::aggregator::MarketAggregator;
use crate::apis::symbols::canonical_ticker;
use crate::apis::types::{DailyCandle, Exchange};
use crate::cache::{CacheTtls, TwoTierCache};
use crate::config::Config;
use crate::errors::ApiResult;
use crate::indicators::{calculate_macd, calculate_rsi, recent_volume_ratio, IndicatorParams, Macd};
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const NEWS_WEIGHT: f64 = 0.3;
const RSI_WEIGHT: f64 = 0.2;
const MACD_WEIGHT: f64 = 0.2;
const VOLUME_WEIGHT: f64 = 0.3;

const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;
const RSI_BIAS: f64 = 0.5;

const MACD_BIAS: f64 = 0.3;

const VOLUME_SURGE_RATIO: f64 = 1.5;
const VOLUME_DRY_RATIO: f64 = 0.5;
const VOLUME_SURGE_BIAS: f64 = 0.4;
const VOLUME_DRY_BIAS: f64 = -0.2;

const BULLISH_ABOVE: f64 = 0.3;
const BEARISH_BELOW: f64 = -0.3;

// ============================================================================
// SOURCES
// ============================================================================

#[async_trait]
pub trait HeadlineSource: Send + Sync {
    async fn headlines(&self, symbol: &str) -> ApiResult<Vec<String>>;
}

#[async_trait]
pub trait SocialSentimentSource: Send + Sync {
    /// Score in [-1, 1]
    async fn social_score(&self, symbol: &str) -> ApiResult<f64>;
}

// ============================================================================
// PURE COMPOSITION
// ============================================================================

/// Derived inputs of one report; `None` marks a component that could not be computed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SentimentInputs {
    pub news: NewsBreakdown,
    pub rsi: Option<f64>,
    pub macd: Option<Macd>,
    pub volume_ratio: Option<f64>,
    pub social_score: Option<f64>,
}

impl SentimentInputs {
    pub fn derive(
        headlines: &[String],
        candles: &[DailyCandle],
        social_score: Option<f64>,
        params: &IndicatorParams,
        volume_lookback: usize,
    ) -> Self {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();

        Self {
            news: NewsBreakdown::tally(headlines),
            rsi: calculate_rsi(&closes, params.rsi_period),
            macd: calculate_macd(
                &closes,
                params.macd_fast,
                params.macd_slow,
                params.macd_signal,
            ),
            volume_ratio: recent_volume_ratio(&volumes, volume_lookback),
            social_score,
        }
    }
}

pub fn rsi_bias(rsi: Option<f64>) -> f64 {
    match rsi {
        Some(value) if value < RSI_OVERSOLD => RSI_BIAS,
        Some(value) if value > RSI_OVERBOUGHT => -RSI_BIAS,
        _ => 0.0,
    }
}

pub fn macd_bias(macd: Option<Macd>) -> f64 {
    match macd {
        Some(m) if m.macd > m.signal => MACD_BIAS,
        Some(_) => -MACD_BIAS,
        None => 0.0,
    }
}

pub fn volume_bias(ratio: Option<f64>) -> f64 {
    match ratio {
        Some(r) if r > VOLUME_SURGE_RATIO => VOLUME_SURGE_BIAS,
        Some(r) if r < VOLUME_DRY_RATIO => VOLUME_DRY_BIAS,
        _ => 0.0,
    }
}

pub fn categorize(composite: f64) -> SentimentCategory {
    if composite > BULLISH_ABOVE {
        SentimentCategory::Bullish
    } else if composite < BEARISH_BELOW {
        SentimentCategory::Bearish
    } else {
        SentimentCategory::Neutral
    }
}

/// Build the report. `None` for a blank symbol or a non-finite composite.
pub fn compose(symbol: &str, inputs: &SentimentInputs) -> Option<SentimentReport> {
    if symbol.trim().is_empty() {
        logger::error(LogTag::Sentiment, "Cannot compose sentiment: blank symbol (stage: input)");
        return None;
    }

    let news = inputs.news.score();
    let components = SentimentComponents {
        news: if news.is_finite() { news } else { 0.0 },
        rsi: rsi_bias(inputs.rsi),
        macd: macd_bias(inputs.macd),
        volume: volume_bias(inputs.volume_ratio),
    };

    let composite = NEWS_WEIGHT * components.news
        + RSI_WEIGHT * components.rsi
        + MACD_WEIGHT * components.macd
        + VOLUME_WEIGHT * components.volume;

    if !composite.is_finite() {
        logger::error(
            LogTag::Sentiment,
            &format!("Non-finite composite for {} (stage: compose)", symbol),
        );
        return None;
    }

    let social = inputs
        .social_score
        .filter(|s| s.is_finite())
        .map(|s| s.clamp(-1.0, 1.0))
        .unwrap_or(0.0);

    Some(SentimentReport {
        symbol: symbol.to_string(),
        composite_score: composite,
        overall_sentiment: categorize(composite),
        components,
        news_breakdown: inputs.news,
        social_sentiment: social,
        timestamp: Utc::now(),
    })
}

// ============================================================================
// COMPOSER SERVICE
// ============================================================================

#[derive(Debug, Clone)]
pub struct ComposerSettings {
    pub reference_exchange: Exchange,
    pub history_days: u32,
    pub volume_lookback: usize,
    pub params: IndicatorParams,
    pub ttl: Duration,
    pub source_timeout: Duration,
}

impl ComposerSettings {
    pub fn from_config(config: &Config) -> Self {
        let reference_exchange = config
            .sentiment
            .reference_exchange
            .parse::<Exchange>()
            .unwrap_or_else(|e| {
                logger::warning(
                    LogTag::Config,
                    &format!("{}; using binance as reference exchange", e),
                );
                Exchange::Binance
            });

        Self {
            reference_exchange,
            history_days: config.sentiment.history_days.max(1),
            volume_lookback: config.sentiment.volume_lookback,
            params: IndicatorParams::from(&config.indicators),
            ttl: CacheTtls::from(&config.cache).sentiment,
            source_timeout: Duration::from_secs(config.sentiment.source_timeout_seconds),
        }
    }
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub struct SentimentComposer {
    aggregator: Arc<MarketAggregator>,
    headlines: Option<Arc<dyn HeadlineSource>>,
    social: Option<Arc<dyn SocialSentimentSource>>,
    cache: Arc<TwoTierCache>,
    settings: ComposerSettings,
}

impl SentimentComposer {
    pub fn new(
        aggregator: Arc<MarketAggregator>,
        headlines: Option<Arc<dyn HeadlineSource>>,
        social: Option<Arc<dyn SocialSentimentSource>>,
        cache: Arc<TwoTierCache>,
        settings: ComposerSettings,
    ) -> Self {
        Self {
            aggregator,
            headlines,
            social,
            cache,
            settings,
        }
    }

    pub fn settings(&self) -> &ComposerSettings {
        &self.settings
    }

    /// Composite report for `symbol`; `None` only on a top-level failure
    pub async fn analyze(&self, symbol: &str) -> Option<SentimentReport> {
        self.analyze_with(symbol, &self.settings.params).await
    }

    /// Same as `analyze` with caller-supplied indicator parameters (not cached)
    pub async fn analyze_with(
        &self,
        symbol: &str,
        params: &IndicatorParams,
    ) -> Option<SentimentReport> {
        let ticker = canonical_ticker(symbol);
        if ticker.is_empty() {
            logger::error(
                LogTag::Sentiment,
                "Cannot analyze sentiment: blank symbol (stage: input)",
            );
            return None;
        }

        let use_cache = *params == self.settings.params;
        let key = format!("sentiment:{}", ticker);
        if use_cache {
            if let Some(report) = self.cache.get::<SentimentReport>(&key) {
                return Some(report);
            }
        }

        let (headlines, social, candles) = tokio::join!(
            self.gather_headlines(&ticker),
            self.gather_social(&ticker),
            self.aggregator.fetch_candles(
                self.settings.reference_exchange,
                &ticker,
                self.settings.history_days
            ),
        );

        if candles.is_empty() {
            logger::warning(
                LogTag::Sentiment,
                &format!(
                    "No {} candles for {}, technical components neutral",
                    self.settings.reference_exchange, ticker
                ),
            );
        }

        let inputs = SentimentInputs::derive(
            &headlines,
            &candles,
            social,
            params,
            self.settings.volume_lookback,
        );
        let report = compose(&ticker, &inputs)?;

        logger::info(
            LogTag::Sentiment,
            &format!(
                "{} sentiment {:?} ({:.3})",
                ticker, report.overall_sentiment, report.composite_score
            ),
        );

        if use_cache {
            self.cache.set(&key, &report, self.settings.ttl);
        }
        Some(report)
    }

    async fn gather_headlines(&self, ticker: &str) -> Vec<String> {
        let Some(source) = &self.headlines else {
            return Vec::new();
        };
        self.bounded("headlines", ticker, source.headlines(ticker))
            .await
            .unwrap_or_default()
    }

    async fn gather_social(&self, ticker: &str) -> Option<f64> {
        let source = self.social.as_ref()?;
        self.bounded("social", ticker, source.social_score(ticker))
            .await
    }

    /// Apply the source timeout; any failure becomes `None` after logging
    async fn bounded<T, F>(&self, stage: &str, ticker: &str, work: F) -> Option<T>
    where
        F: Future<Output = ApiResult<T>>,
    {
        match tokio::time::timeout(self.settings.source_timeout, work).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                logger::warning(
                    LogTag::Sentiment,
                    &format!("{} source unavailable for {}: {}", stage, ticker, e),
                );
                None
            }
            Err(_) => {
                logger::warning(
                    LogTag::Sentiment,
                    &format!(
                        "{} source timed out for {} after {:?}",
                        stage, ticker, self.settings.source_timeout
                    ),
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::AggregatorSettings;
    use crate::apis::adapter::ExchangeAdapter;
    use crate::apis::stats::ApiStatsTracker;
    use crate::apis::types::{finalize_candles, Ticker};
    use crate::cache::CacheConfig;
    use crate::errors::ApiError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedHeadlines(Vec<String>);

    #[async_trait]
    impl HeadlineSource for FixedHeadlines {
        async fn headlines(&self, _symbol: &str) -> ApiResult<Vec<String>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSocial;

    #[async_trait]
    impl SocialSentimentSource for FailingSocial {
        async fn social_score(&self, _symbol: &str) -> ApiResult<f64> {
            Err(ApiError::HttpStatus {
                status: 429,
                body: "rate limited".to_string(),
            })
        }
    }

    struct FixedSocial(f64);

    #[async_trait]
    impl SocialSentimentSource for FixedSocial {
        async fn social_score(&self, _symbol: &str) -> ApiResult<f64> {
            Ok(self.0)
        }
    }

    struct CandleAdapter {
        candles: Vec<DailyCandle>,
        calls: AtomicUsize,
        stats: ApiStatsTracker,
    }

    #[async_trait]
    impl ExchangeAdapter for CandleAdapter {
        fn exchange(&self) -> Exchange {
            Exchange::Binance
        }

        fn stats(&self) -> &ApiStatsTracker {
            &self.stats
        }

        async fn fetch_ticker(&self, _symbol: &str) -> ApiResult<Ticker> {
            Err(ApiError::Disabled)
        }

        async fn fetch_daily_candles(&self, _symbol: &str, days: u32) -> ApiResult<Vec<DailyCandle>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(finalize_candles(self.candles.clone(), days))
        }
    }

    /// 30 rising closes with a volume surge on the last day
    fn rally_candles() -> Vec<DailyCandle> {
        (0..30)
            .map(|day| DailyCandle {
                open_time: 1_716_940_800 + day * 86_400,
                close: 100.0 + day as f64,
                volume: if day == 29 { 400.0 } else { 100.0 },
            })
            .collect()
    }

    fn composer(
        candles: Vec<DailyCandle>,
        headlines: Option<Arc<dyn HeadlineSource>>,
        social: Option<Arc<dyn SocialSentimentSource>>,
    ) -> (SentimentComposer, Arc<CandleAdapter>) {
        let adapter = Arc::new(CandleAdapter {
            candles,
            calls: AtomicUsize::new(0),
            stats: ApiStatsTracker::new(),
        });
        let cache = Arc::new(TwoTierCache::local_only(CacheConfig::default()));
        let aggregator = Arc::new(MarketAggregator::new(
            vec![adapter.clone() as Arc<dyn ExchangeAdapter>],
            cache.clone(),
            AggregatorSettings::default(),
        ));
        let composer = SentimentComposer::new(
            aggregator,
            headlines,
            social,
            cache,
            ComposerSettings::default(),
        );
        (composer, adapter)
    }

    #[test]
    fn test_component_biases() {
        assert_eq!(rsi_bias(Some(25.0)), 0.5);
        assert_eq!(rsi_bias(Some(75.0)), -0.5);
        assert_eq!(rsi_bias(Some(50.0)), 0.0);
        assert_eq!(rsi_bias(None), 0.0);

        let up = Macd {
            macd: 1.0,
            signal: 0.5,
            histogram: 0.5,
        };
        let flat = Macd {
            macd: 0.0,
            signal: 0.0,
            histogram: 0.0,
        };
        assert_eq!(macd_bias(Some(up)), 0.3);
        assert_eq!(macd_bias(Some(flat)), -0.3);
        assert_eq!(macd_bias(None), 0.0);

        assert_eq!(volume_bias(Some(2.0)), 0.4);
        assert_eq!(volume_bias(Some(0.3)), -0.2);
        assert_eq!(volume_bias(Some(1.0)), 0.0);
        assert_eq!(volume_bias(None), 0.0);
    }

    #[test]
    fn test_categorize_boundaries() {
        assert_eq!(categorize(0.31), SentimentCategory::Bullish);
        assert_eq!(categorize(0.3), SentimentCategory::Neutral);
        assert_eq!(categorize(-0.3), SentimentCategory::Neutral);
        assert_eq!(categorize(-0.31), SentimentCategory::Bearish);
    }

    #[test]
    fn test_composite_stays_in_range_for_all_components() {
        let news_cases = [
            NewsBreakdown::default(),
            NewsBreakdown {
                positive: 5,
                negative: 0,
                neutral: 0,
                total: 5,
            },
            NewsBreakdown {
                positive: 0,
                negative: 5,
                neutral: 0,
                total: 5,
            },
            NewsBreakdown {
                positive: 1,
                negative: 2,
                neutral: 1,
                total: 4,
            },
        ];
        let rsi_cases = [None, Some(10.0), Some(50.0), Some(90.0), Some(100.0)];
        let macd_cases = [
            None,
            Some(Macd {
                macd: 2.0,
                signal: 1.0,
                histogram: 1.0,
            }),
            Some(Macd {
                macd: -2.0,
                signal: 1.0,
                histogram: -3.0,
            }),
        ];
        let volume_cases = [None, Some(0.1), Some(1.0), Some(10.0)];

        let mut extremes = (f64::MAX, f64::MIN);
        for news in news_cases {
            for rsi in rsi_cases {
                for macd in macd_cases {
                    for volume_ratio in volume_cases {
                        let inputs = SentimentInputs {
                            news,
                            rsi,
                            macd,
                            volume_ratio,
                            social_score: Some(1.0),
                        };
                        let report = compose("BTC", &inputs).unwrap();
                        assert!((-1.0..=1.0).contains(&report.composite_score));
                        extremes.0 = extremes.0.min(report.composite_score);
                        extremes.1 = extremes.1.max(report.composite_score);
                    }
                }
            }
        }

        assert!((extremes.0 + 0.52).abs() < 1e-9);
        assert!((extremes.1 - 0.58).abs() < 1e-9);
    }

    #[test]
    fn test_compose_all_neutral() {
        let report = compose("ETH", &SentimentInputs::default()).unwrap();
        assert_eq!(report.composite_score, 0.0);
        assert_eq!(report.overall_sentiment, SentimentCategory::Neutral);
        assert_eq!(report.social_sentiment, 0.0);
        assert_eq!(report.news_breakdown.total, 0);
    }

    #[test]
    fn test_compose_blank_symbol_is_absent() {
        assert!(compose("  ", &SentimentInputs::default()).is_none());
    }

    #[test]
    fn test_report_serializes_with_documented_fields() {
        let report = compose("BTC", &SentimentInputs::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        for field in [
            "symbol",
            "composite_score",
            "overall_sentiment",
            "components",
            "news_breakdown",
            "social_sentiment",
            "timestamp",
        ] {
            assert!(json.get(field).is_some(), "missing {}", field);
        }
        assert_eq!(json["overall_sentiment"], "neutral");
        for field in ["news", "rsi", "macd", "volume"] {
            assert!(json["components"].get(field).is_some());
        }
        for field in ["positive", "negative", "neutral", "total"] {
            assert!(json["news_breakdown"].get(field).is_some());
        }
    }

    #[tokio::test]
    async fn test_analyze_rally() {
        let headlines: Arc<dyn HeadlineSource> = Arc::new(FixedHeadlines(vec![
            "Bitcoin rally extends to record high".to_string(),
            "ETF inflows surge".to_string(),
        ]));
        let social: Arc<dyn SocialSentimentSource> = Arc::new(FixedSocial(0.45));
        let (composer, _) = composer(rally_candles(), Some(headlines), Some(social));

        let report = composer.analyze("bitcoin").await.unwrap();
        assert_eq!(report.symbol, "BTC");
        assert_eq!(report.components.news, 1.0);
        // strictly rising closes: RSI 100 → overbought
        assert_eq!(report.components.rsi, -0.5);
        assert_eq!(report.components.macd, 0.3);
        // 400 vs mean(100, 100, 100)
        assert_eq!(report.components.volume, 0.4);
        assert!((report.composite_score - (0.3 - 0.1 + 0.06 + 0.12)).abs() < 1e-9);
        assert_eq!(report.overall_sentiment, SentimentCategory::Bullish);
        assert_eq!(report.social_sentiment, 0.45);
    }

    #[tokio::test]
    async fn test_failed_components_are_neutral() {
        let social: Arc<dyn SocialSentimentSource> = Arc::new(FailingSocial);
        let (composer, _) = composer(Vec::new(), None, Some(social));

        let report = composer.analyze("ETH").await.unwrap();
        assert_eq!(report.components, SentimentComponents::default());
        assert_eq!(report.composite_score, 0.0);
        assert_eq!(report.social_sentiment, 0.0);
    }

    #[tokio::test]
    async fn test_analyze_blank_symbol() {
        let (composer, adapter) = composer(rally_candles(), None, None);
        assert!(composer.analyze("").await.is_none());
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reports_are_cached() {
        let (composer, adapter) = composer(rally_candles(), None, None);

        let first = composer.analyze("BTC").await.unwrap();
        let second = composer.analyze("bitcoin").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 1);
    }
}
