/// Exchange adapter contract
///
/// Implementors only provide the two raw, fallible calls. The public
/// `fetch_*` operations are provided here: they never fail, they log the
/// reason a venue was unavailable and degrade to `None` / an empty series.
use super::stats::{ApiStats, ApiStatsTracker};
use super::symbols::SymbolMapper;
use super::types::{DailyCandle, Exchange, Ticker};
use crate::errors::{ApiError, ApiResult};
use crate::logger::{self, LogTag};
use async_trait::async_trait;

#[async_trait]
pub trait ExchangeAdapter: Send + Sync {
    fn exchange(&self) -> Exchange;

    fn stats(&self) -> &ApiStatsTracker;

    fn mapper(&self) -> SymbolMapper {
        SymbolMapper::for_exchange(self.exchange())
    }

    /// 24h ticker for `symbol` against the venue's USD-like quote
    async fn fetch_ticker(&self, symbol: &str) -> ApiResult<Ticker>;

    /// Daily bars, oldest first, at most `days` of them
    async fn fetch_daily_candles(&self, symbol: &str, days: u32) -> ApiResult<Vec<DailyCandle>>;

    /// 24h quote-currency volume, `None` when unavailable
    async fn fetch_volume(&self, symbol: &str) -> Option<f64> {
        match self.fetch_ticker(symbol).await {
            Ok(ticker) => Some(ticker.quote_volume),
            Err(e) => {
                self.report_unavailable(symbol, "volume", &e).await;
                None
            }
        }
    }

    /// Last traded price, `None` when unavailable
    async fn fetch_price(&self, symbol: &str) -> Option<f64> {
        match self.fetch_ticker(symbol).await {
            Ok(ticker) => Some(ticker.last_price),
            Err(e) => {
                self.report_unavailable(symbol, "price", &e).await;
                None
            }
        }
    }

    /// Daily bars, empty when unavailable
    async fn fetch_candles(&self, symbol: &str, days: u32) -> Vec<DailyCandle> {
        if days == 0 {
            return Vec::new();
        }
        match self.fetch_daily_candles(symbol, days).await {
            Ok(candles) => candles,
            Err(e) => {
                self.report_unavailable(symbol, "historical", &e).await;
                Vec::new()
            }
        }
    }

    /// Daily quote volumes, oldest first
    async fn fetch_historical(&self, symbol: &str, days: u32) -> Vec<f64> {
        self.fetch_candles(symbol, days)
            .await
            .into_iter()
            .map(|c| c.volume)
            .collect()
    }

    /// Daily closes, oldest first
    async fn fetch_close_history(&self, symbol: &str, days: u32) -> Vec<f64> {
        self.fetch_candles(symbol, days)
            .await
            .into_iter()
            .map(|c| c.close)
            .collect()
    }

    async fn get_stats(&self) -> ApiStats {
        self.stats().get_stats().await
    }

    async fn report_unavailable(&self, symbol: &str, operation: &str, error: &ApiError) {
        logger::warning(
            LogTag::Exchange,
            &format!(
                "{} {} unavailable for {} [{}]: {}",
                self.exchange(),
                operation,
                self.mapper().pair(symbol),
                error.kind(),
                error
            ),
        );
        self.stats().record_error(operation, error.to_string()).await;
    }
}
