/// Binance spot API client
///
/// API Documentation: https://developers.binance.com/docs/binance-spot-api-docs/rest-api
///
/// Endpoints implemented:
/// 1. /api/v3/ticker/24hr?symbol={pair} - 24h rolling ticker
/// 2. /api/v3/klines?symbol={pair}&interval=1d&limit={n} - Daily klines

pub mod types;

use self::types::{BinanceError, BinanceTicker};
use crate::apis::adapter::ExchangeAdapter;
use crate::apis::client::TransportPool;
use crate::apis::stats::ApiStatsTracker;
use crate::apis::types::{
    finalize_candles, normalize_timestamp, parse_decimal, row_f64, DailyCandle, Exchange, Ticker,
};
use crate::errors::{ApiError, ApiResult};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// API CONFIGURATION
// ============================================================================

const BINANCE_BASE_URL: &str = "https://api.binance.com";

/// Maximum klines per request
const MAX_KLINES: u32 = 1000;

// Kline row layout
const KLINE_OPEN_TIME: usize = 0;
const KLINE_CLOSE: usize = 4;
const KLINE_QUOTE_VOLUME: usize = 7;

// ============================================================================
// CLIENT IMPLEMENTATION
// ============================================================================

pub struct BinanceClient {
    transport: Arc<TransportPool>,
    stats: ApiStatsTracker,
    timeout: Duration,
}

impl BinanceClient {
    pub fn new(transport: Arc<TransportPool>, timeout: Duration) -> Self {
        Self {
            transport,
            stats: ApiStatsTracker::new(),
            timeout,
        }
    }
}

#[async_trait]
impl ExchangeAdapter for BinanceClient {
    fn exchange(&self) -> Exchange {
        Exchange::Binance
    }

    fn stats(&self) -> &ApiStatsTracker {
        &self.stats
    }

    async fn fetch_ticker(&self, symbol: &str) -> ApiResult<Ticker> {
        let url = format!("{}/api/v3/ticker/24hr", BINANCE_BASE_URL);
        let query = [("symbol", self.mapper().pair(symbol))];

        let raw: BinanceTicker = self
            .transport
            .get_json("ticker/24hr", &url, &query, self.timeout, &self.stats)
            .await
            .map_err(explain_status)?;

        parse_ticker(&raw)
    }

    async fn fetch_daily_candles(&self, symbol: &str, days: u32) -> ApiResult<Vec<DailyCandle>> {
        let url = format!("{}/api/v3/klines", BINANCE_BASE_URL);
        let query = [
            ("symbol", self.mapper().pair(symbol)),
            ("interval", "1d".to_string()),
            ("limit", days.min(MAX_KLINES).to_string()),
        ];

        let rows: Vec<Vec<Value>> = self
            .transport
            .get_json("klines", &url, &query, self.timeout, &self.stats)
            .await
            .map_err(explain_status)?;

        parse_klines(&rows, days)
    }
}

// ============================================================================
// RESPONSE PARSING
// ============================================================================

pub fn parse_ticker(raw: &BinanceTicker) -> ApiResult<Ticker> {
    Ticker::new(
        parse_decimal(&raw.last_price, "lastPrice")?,
        parse_decimal(&raw.quote_volume, "quoteVolume")?,
    )
}

pub fn parse_klines(rows: &[Vec<Value>], days: u32) -> ApiResult<Vec<DailyCandle>> {
    let candles = rows
        .iter()
        .map(|row| {
            let open_time = row
                .get(KLINE_OPEN_TIME)
                .and_then(Value::as_i64)
                .ok_or_else(|| ApiError::malformed("kline row missing open time"))?;
            Ok(DailyCandle {
                open_time: normalize_timestamp(open_time),
                close: row_f64(row, KLINE_CLOSE, "close")?,
                volume: row_f64(row, KLINE_QUOTE_VOLUME, "quoteAssetVolume")?,
            })
        })
        .collect::<ApiResult<Vec<_>>>()?;

    Ok(finalize_candles(candles, days))
}

/// Binance reports rejections (unknown symbol etc.) as 4xx with a JSON code
fn explain_status(error: ApiError) -> ApiError {
    if let ApiError::HttpStatus { body, .. } = &error {
        if let Ok(rejection) = serde_json::from_str::<BinanceError>(body) {
            return ApiError::protocol(rejection.code, rejection.msg);
        }
    }
    error
}
