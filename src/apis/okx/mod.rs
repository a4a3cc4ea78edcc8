/// OKX v5 public market API client
///
/// Endpoints implemented:
/// 1. /api/v5/market/ticker?instId={pair} - 24h ticker
/// 2. /api/v5/market/candles?instId={pair}&bar=1D&limit={n} - Daily candles

pub mod types;

use self::types::{OkxCandleRow, OkxResponse, OkxTicker};
use crate::apis::adapter::ExchangeAdapter;
use crate::apis::client::TransportPool;
use crate::apis::stats::ApiStatsTracker;
use crate::apis::types::{
    finalize_candles, normalize_timestamp, parse_decimal, string_row_f64, DailyCandle, Exchange,
    Ticker,
};
use crate::errors::{ApiError, ApiResult};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

const OKX_BASE_URL: &str = "https://www.okx.com";

const SUCCESS_CODE: &str = "0";

const MAX_CANDLES: u32 = 300;

const CANDLE_TS: usize = 0;
const CANDLE_CLOSE: usize = 4;
const CANDLE_VOL_QUOTE: usize = 7;

pub struct OkxClient {
    transport: Arc<TransportPool>,
    stats: ApiStatsTracker,
    timeout: Duration,
}

impl OkxClient {
    pub fn new(transport: Arc<TransportPool>, timeout: Duration) -> Self {
        Self {
            transport,
            stats: ApiStatsTracker::new(),
            timeout,
        }
    }
}

#[async_trait]
impl ExchangeAdapter for OkxClient {
    fn exchange(&self) -> Exchange {
        Exchange::Okx
    }

    fn stats(&self) -> &ApiStatsTracker {
        &self.stats
    }

    async fn fetch_ticker(&self, symbol: &str) -> ApiResult<Ticker> {
        let url = format!("{}/api/v5/market/ticker", OKX_BASE_URL);
        let query = [("instId", self.mapper().pair(symbol))];

        let response: OkxResponse<OkxTicker> = self
            .transport
            .get_json("market/ticker", &url, &query, self.timeout, &self.stats)
            .await?;

        let data = unwrap_data(response)?;
        let ticker = data
            .first()
            .ok_or_else(|| ApiError::malformed("ticker data is empty"))?;
        parse_ticker(ticker)
    }

    async fn fetch_daily_candles(&self, symbol: &str, days: u32) -> ApiResult<Vec<DailyCandle>> {
        let url = format!("{}/api/v5/market/candles", OKX_BASE_URL);
        let query = [
            ("instId", self.mapper().pair(symbol)),
            ("bar", "1D".to_string()),
            ("limit", days.min(MAX_CANDLES).to_string()),
        ];

        let response: OkxResponse<OkxCandleRow> = self
            .transport
            .get_json("market/candles", &url, &query, self.timeout, &self.stats)
            .await?;

        parse_candles(&unwrap_data(response)?, days)
    }
}

fn unwrap_data<T>(response: OkxResponse<T>) -> ApiResult<Vec<T>> {
    if response.code != SUCCESS_CODE {
        return Err(ApiError::protocol(response.code, response.msg));
    }
    Ok(response.data)
}

pub fn parse_ticker(raw: &OkxTicker) -> ApiResult<Ticker> {
    Ticker::new(
        parse_decimal(&raw.last, "last")?,
        parse_decimal(&raw.vol_ccy24h, "volCcy24h")?,
    )
}

pub fn parse_candles(rows: &[OkxCandleRow], days: u32) -> ApiResult<Vec<DailyCandle>> {
    let candles = rows
        .iter()
        .map(|row| {
            Ok(DailyCandle {
                open_time: normalize_timestamp(string_row_f64(row, CANDLE_TS, "ts")? as i64),
                close: string_row_f64(row, CANDLE_CLOSE, "c")?,
                volume: string_row_f64(row, CANDLE_VOL_QUOTE, "volCcyQuote")?,
            })
        })
        .collect::<ApiResult<Vec<_>>>()?;

    Ok(finalize_candles(candles, days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::client::decode;

    #[test]
    fn test_parse_ticker() {
        let response: OkxResponse<OkxTicker> = decode(
            br#"{"code":"0","msg":"","data":[{"instType":"SPOT","instId":"BTC-USDT","last":"67010.2","lastSz":"0.01","vol24h":"9000.5","volCcy24h":"603000000.7","ts":"1717086399000"}]}"#,
        )
        .unwrap();
        let data = unwrap_data(response).unwrap();
        let ticker = parse_ticker(&data[0]).unwrap();
        assert_eq!(ticker.last_price, 67010.2);
        assert_eq!(ticker.quote_volume, 603000000.7);
    }

    #[test]
    fn test_unknown_instrument_is_protocol_error() {
        let response: OkxResponse<OkxTicker> =
            decode(br#"{"code":"51001","msg":"Instrument ID does not exist","data":[]}"#).unwrap();
        assert!(matches!(
            unwrap_data(response),
            Err(ApiError::Protocol { ref code, .. }) if code == "51001"
        ));
    }

    #[test]
    fn test_parse_candles() {
        let response: OkxResponse<OkxCandleRow> = decode(
            br#"{"code":"0","msg":"","data":[
                ["1717027200000","67500","69000","67000","68500","120","8220000","8220000","1"],
                ["1716940800000","67000","68000","66000","67500","100","6750000","6750000","1"]
            ]}"#,
        )
        .unwrap();
        let candles = parse_candles(&unwrap_data(response).unwrap(), 1).unwrap();
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].open_time, 1717027200);
        assert_eq!(candles[0].volume, 8220000.0);
    }
}
