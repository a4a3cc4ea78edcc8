/// Coinbase Exchange public API client
///
/// Endpoints implemented:
/// 1. /products/{pair}/stats - 24h stats (base volume, last price)
/// 2. /products/{pair}/candles?granularity=86400 - Daily candles, newest first

pub mod types;

use self::types::{CoinbaseError, CoinbaseStats};
use crate::apis::adapter::ExchangeAdapter;
use crate::apis::client::{encode_path_segment, TransportPool};
use crate::apis::stats::ApiStatsTracker;
use crate::apis::types::{
    finalize_candles, normalize_timestamp, parse_decimal, row_f64, DailyCandle, Exchange, Ticker,
};
use crate::errors::{ApiError, ApiResult};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const COINBASE_BASE_URL: &str = "https://api.exchange.coinbase.com";

/// One day in seconds
const DAILY_GRANULARITY: u32 = 86_400;

/// Candles endpoint caps each response at 300 rows
const MAX_CANDLES: u32 = 300;

// [time, low, high, open, close, volume]
const CANDLE_TIME: usize = 0;
const CANDLE_CLOSE: usize = 4;
const CANDLE_VOLUME: usize = 5;

pub struct CoinbaseClient {
    transport: Arc<TransportPool>,
    stats: ApiStatsTracker,
    timeout: Duration,
}

impl CoinbaseClient {
    pub fn new(transport: Arc<TransportPool>, timeout: Duration) -> Self {
        Self {
            transport,
            stats: ApiStatsTracker::new(),
            timeout,
        }
    }

    fn product_url(&self, symbol: &str, resource: &str) -> String {
        format!(
            "{}/products/{}/{}",
            COINBASE_BASE_URL,
            encode_path_segment(&self.mapper().pair(symbol)),
            resource
        )
    }
}

#[async_trait]
impl ExchangeAdapter for CoinbaseClient {
    fn exchange(&self) -> Exchange {
        Exchange::Coinbase
    }

    fn stats(&self) -> &ApiStatsTracker {
        &self.stats
    }

    async fn fetch_ticker(&self, symbol: &str) -> ApiResult<Ticker> {
        let url = self.product_url(symbol, "stats");
        let raw: CoinbaseStats = self
            .transport
            .get_json("products/stats", &url, &[], self.timeout, &self.stats)
            .await
            .map_err(explain_status)?;

        parse_stats(&raw)
    }

    async fn fetch_daily_candles(&self, symbol: &str, days: u32) -> ApiResult<Vec<DailyCandle>> {
        let url = self.product_url(symbol, "candles");
        let query = [("granularity", DAILY_GRANULARITY.to_string())];

        let rows: Vec<Vec<Value>> = self
            .transport
            .get_json("products/candles", &url, &query, self.timeout, &self.stats)
            .await
            .map_err(explain_status)?;

        parse_candles(&rows, days.min(MAX_CANDLES))
    }
}

/// Coinbase reports base-currency volume; convert to quote turnover
pub fn parse_stats(raw: &CoinbaseStats) -> ApiResult<Ticker> {
    let last = parse_decimal(&raw.last, "last")?;
    let base_volume = parse_decimal(&raw.volume, "volume")?;
    Ticker::new(last, base_volume * last)
}

pub fn parse_candles(rows: &[Vec<Value>], days: u32) -> ApiResult<Vec<DailyCandle>> {
    let candles = rows
        .iter()
        .map(|row| {
            let time = row_f64(row, CANDLE_TIME, "time")? as i64;
            let close = row_f64(row, CANDLE_CLOSE, "close")?;
            Ok(DailyCandle {
                open_time: normalize_timestamp(time),
                close,
                volume: row_f64(row, CANDLE_VOLUME, "volume")? * close,
            })
        })
        .collect::<ApiResult<Vec<_>>>()?;

    Ok(finalize_candles(candles, days))
}

fn explain_status(error: ApiError) -> ApiError {
    if let ApiError::HttpStatus { status, body } = &error {
        if let Ok(rejection) = serde_json::from_str::<CoinbaseError>(body) {
            return ApiError::protocol(status, rejection.message);
        }
    }
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::client::decode;

    #[test]
    fn test_parse_stats_converts_to_quote_volume() {
        let raw: CoinbaseStats = decode(
            br#"{"open":"66000.00","high":"68000.00","low":"65500.00","last":"67000.00","volume":"1000.5","volume_30day":"41000"}"#,
        )
        .unwrap();
        let ticker = parse_stats(&raw).unwrap();
        assert_eq!(ticker.last_price, 67000.0);
        assert!((ticker.quote_volume - 1000.5 * 67000.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_candles_reverses_order() {
        let rows: Vec<Vec<Value>> = decode(
            br#"[
            [1717113600, 66000, 69000, 67000, 68000, 10],
            [1717027200, 65000, 68000, 66000, 67000, 20],
            [1716940800, 64000, 67000, 65000, 66000, 30]
        ]"#,
        )
        .unwrap();

        let candles = parse_candles(&rows, 2).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].open_time, 1717027200);
        assert_eq!(candles[0].volume, 20.0 * 67000.0);
        assert_eq!(candles[1].close, 68000.0);
    }

    #[test]
    fn test_not_found_becomes_protocol_error() {
        let error = explain_status(ApiError::HttpStatus {
            status: 404,
            body: r#"{"message":"NotFound"}"#.to_string(),
        });
        assert!(matches!(error, ApiError::Protocol { ref code, .. } if code == "404"));
    }

    #[test]
    fn test_bad_price_is_malformed() {
        let raw = CoinbaseStats {
            open: "1".into(),
            high: "1".into(),
            low: "1".into(),
            last: "n/a".into(),
            volume: "1".into(),
        };
        assert!(matches!(parse_stats(&raw), Err(ApiError::Malformed(_))));
    }
}
