/// Kraken public API client
///
/// Endpoints implemented:
/// 1. /0/public/Ticker?pair={pair} - 24h ticker
/// 2. /0/public/OHLC?pair={pair}&interval=1440 - Daily OHLC
///
/// Kraken answers HTTP 200 for rejected requests and reports the failure in
/// the `error` array.

pub mod types;

use self::types::{KrakenOhlcResult, KrakenResponse, KrakenTicker, KrakenTickerResult};
use crate::apis::adapter::ExchangeAdapter;
use crate::apis::client::TransportPool;
use crate::apis::stats::ApiStatsTracker;
use crate::apis::types::{
    finalize_candles, normalize_timestamp, parse_decimal, row_f64, DailyCandle, Exchange, Ticker,
};
use crate::errors::{ApiError, ApiResult};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

const KRAKEN_BASE_URL: &str = "https://api.kraken.com";

/// Minutes per daily bar
const DAILY_INTERVAL: u32 = 1440;

// [time, open, high, low, close, vwap, volume, count]
const OHLC_TIME: usize = 0;
const OHLC_CLOSE: usize = 4;
const OHLC_VWAP: usize = 5;
const OHLC_VOLUME: usize = 6;

pub struct KrakenClient {
    transport: Arc<TransportPool>,
    stats: ApiStatsTracker,
    timeout: Duration,
}

impl KrakenClient {
    pub fn new(transport: Arc<TransportPool>, timeout: Duration) -> Self {
        Self {
            transport,
            stats: ApiStatsTracker::new(),
            timeout,
        }
    }
}

#[async_trait]
impl ExchangeAdapter for KrakenClient {
    fn exchange(&self) -> Exchange {
        Exchange::Kraken
    }

    fn stats(&self) -> &ApiStatsTracker {
        &self.stats
    }

    async fn fetch_ticker(&self, symbol: &str) -> ApiResult<Ticker> {
        let url = format!("{}/0/public/Ticker", KRAKEN_BASE_URL);
        let query = [("pair", self.mapper().pair(symbol))];

        let response: KrakenResponse<KrakenTickerResult> = self
            .transport
            .get_json("Ticker", &url, &query, self.timeout, &self.stats)
            .await?;

        let result = unwrap_result(response)?;
        let ticker = result
            .values()
            .next()
            .ok_or_else(|| ApiError::malformed("ticker result is empty"))?;
        parse_ticker(ticker)
    }

    async fn fetch_daily_candles(&self, symbol: &str, days: u32) -> ApiResult<Vec<DailyCandle>> {
        let url = format!("{}/0/public/OHLC", KRAKEN_BASE_URL);
        let query = [
            ("pair", self.mapper().pair(symbol)),
            ("interval", DAILY_INTERVAL.to_string()),
        ];

        let response: KrakenResponse<KrakenOhlcResult> = self
            .transport
            .get_json("OHLC", &url, &query, self.timeout, &self.stats)
            .await?;

        parse_ohlc(&unwrap_result(response)?, days)
    }
}

fn unwrap_result<T>(response: KrakenResponse<T>) -> ApiResult<T> {
    if let Some(first) = response.error.first() {
        let (code, message) = first.split_once(':').unwrap_or(("EGeneral", first.as_str()));
        return Err(ApiError::protocol(code, message));
    }
    response
        .result
        .ok_or_else(|| ApiError::malformed("response has neither error nor result"))
}

/// Quote volume is approximated as 24h base volume × 24h VWAP
pub fn parse_ticker(raw: &KrakenTicker) -> ApiResult<Ticker> {
    let last = ticker_field(&raw.c, 0, "c")?;
    let volume_24h = ticker_field(&raw.v, 1, "v")?;
    let vwap_24h = ticker_field(&raw.p, 1, "p")?;
    Ticker::new(last, volume_24h * vwap_24h)
}

fn ticker_field(values: &[String], idx: usize, name: &str) -> ApiResult<f64> {
    let value = values
        .get(idx)
        .ok_or_else(|| ApiError::malformed(format!("ticker field '{}' too short", name)))?;
    parse_decimal(value, name)
}

pub fn parse_ohlc(result: &KrakenOhlcResult, days: u32) -> ApiResult<Vec<DailyCandle>> {
    let rows = result
        .iter()
        .filter(|(key, _)| key.as_str() != "last")
        .find_map(|(_, value)| value.as_array())
        .ok_or_else(|| ApiError::malformed("OHLC result has no rows"))?;

    let candles = rows
        .iter()
        .map(|row| {
            let row = row
                .as_array()
                .ok_or_else(|| ApiError::malformed("OHLC row is not an array"))?;
            Ok(DailyCandle {
                open_time: normalize_timestamp(row_f64(row, OHLC_TIME, "time")? as i64),
                close: row_f64(row, OHLC_CLOSE, "close")?,
                volume: row_f64(row, OHLC_VOLUME, "volume")? * row_f64(row, OHLC_VWAP, "vwap")?,
            })
        })
        .collect::<ApiResult<Vec<_>>>()?;

    Ok(finalize_candles(candles, days))
}
