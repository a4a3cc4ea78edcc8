/// KuCoin spot public API client
///
/// Endpoints implemented:
/// 1. /api/v1/market/stats?symbol={pair} - 24h stats
/// 2. /api/v1/market/candles?type=1day&symbol={pair}&startAt={ts} - Daily candles

pub mod types;

use self::types::{KucoinCandleRows, KucoinResponse, KucoinStats};
use crate::apis::adapter::ExchangeAdapter;
use crate::apis::client::TransportPool;
use crate::apis::stats::ApiStatsTracker;
use crate::apis::types::{
    finalize_candles, normalize_timestamp, parse_decimal, string_row_f64, DailyCandle, Exchange,
    Ticker,
};
use crate::errors::{ApiError, ApiResult};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

const KUCOIN_BASE_URL: &str = "https://api.kucoin.com";

const SUCCESS_CODE: &str = "200000";

const SECONDS_PER_DAY: i64 = 86_400;

/// Candles endpoint returns at most 1500 rows
const MAX_CANDLES: u32 = 1500;

const CANDLE_TIME: usize = 0;
const CANDLE_CLOSE: usize = 2;
const CANDLE_TURNOVER: usize = 6;

pub struct KucoinClient {
    transport: Arc<TransportPool>,
    stats: ApiStatsTracker,
    timeout: Duration,
}

impl KucoinClient {
    pub fn new(transport: Arc<TransportPool>, timeout: Duration) -> Self {
        Self {
            transport,
            stats: ApiStatsTracker::new(),
            timeout,
        }
    }
}

#[async_trait]
impl ExchangeAdapter for KucoinClient {
    fn exchange(&self) -> Exchange {
        Exchange::Kucoin
    }

    fn stats(&self) -> &ApiStatsTracker {
        &self.stats
    }

    async fn fetch_ticker(&self, symbol: &str) -> ApiResult<Ticker> {
        let url = format!("{}/api/v1/market/stats", KUCOIN_BASE_URL);
        let query = [("symbol", self.mapper().pair(symbol))];

        let response: KucoinResponse<KucoinStats> = self
            .transport
            .get_json("market/stats", &url, &query, self.timeout, &self.stats)
            .await?;

        parse_stats(&unwrap_data(response)?)
    }

    async fn fetch_daily_candles(&self, symbol: &str, days: u32) -> ApiResult<Vec<DailyCandle>> {
        let days = days.min(MAX_CANDLES);
        let url = format!("{}/api/v1/market/candles", KUCOIN_BASE_URL);
        let start_at = Utc::now().timestamp() - i64::from(days) * SECONDS_PER_DAY;
        let query = [
            ("type", "1day".to_string()),
            ("symbol", self.mapper().pair(symbol)),
            ("startAt", start_at.to_string()),
        ];

        let response: KucoinResponse<KucoinCandleRows> = self
            .transport
            .get_json("market/candles", &url, &query, self.timeout, &self.stats)
            .await?;

        parse_candles(&unwrap_data(response)?, days)
    }
}

fn unwrap_data<T>(response: KucoinResponse<T>) -> ApiResult<T> {
    if response.code != SUCCESS_CODE {
        return Err(ApiError::protocol(
            response.code,
            response.msg.unwrap_or_default(),
        ));
    }
    response
        .data
        .ok_or_else(|| ApiError::malformed("response has no data"))
}

pub fn parse_stats(raw: &KucoinStats) -> ApiResult<Ticker> {
    let last = raw
        .last
        .as_deref()
        .ok_or_else(|| ApiError::malformed("stats missing 'last' (unknown pair?)"))?;
    let turnover = raw
        .vol_value
        .as_deref()
        .ok_or_else(|| ApiError::malformed("stats missing 'volValue'"))?;

    Ticker::new(
        parse_decimal(last, "last")?,
        parse_decimal(turnover, "volValue")?,
    )
}

pub fn parse_candles(rows: &KucoinCandleRows, days: u32) -> ApiResult<Vec<DailyCandle>> {
    let candles = rows
        .iter()
        .map(|row| {
            Ok(DailyCandle {
                open_time: normalize_timestamp(string_row_f64(row, CANDLE_TIME, "time")? as i64),
                close: string_row_f64(row, CANDLE_CLOSE, "close")?,
                volume: string_row_f64(row, CANDLE_TURNOVER, "turnover")?,
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
    fn test_parse_stats() {
        let response: KucoinResponse<KucoinStats> = decode(
            br#"{"code":"200000","data":{"time":1717086399000,"symbol":"BTC-USDT","buy":"67000.1","sell":"67000.2","last":"67000.15","vol":"1500.2","volValue":"100513401.3"}}"#,
        )
        .unwrap();
        let ticker = parse_stats(&unwrap_data(response).unwrap()).unwrap();
        assert_eq!(ticker.last_price, 67000.15);
        assert_eq!(ticker.quote_volume, 100513401.3);
    }

    fn decodes_as_response<T: serde::de::DeserializeOwned>() {}

    #[test]
    fn test_envelopes_decode_without_default_payload() {
        decodes_as_response::<KucoinResponse<KucoinStats>>();
        decodes_as_response::<KucoinResponse<KucoinCandleRows>>();

        let response: KucoinResponse<KucoinCandleRows> =
            decode(br#"{"code":"200000"}"#).unwrap();
        assert!(response.data.is_none());
        assert!(matches!(unwrap_data(response), Err(ApiError::Malformed(_))));
    }

    #[test]
    fn test_unknown_pair_with_null_fields_is_malformed() {
        let response: KucoinResponse<KucoinStats> = decode(
            br#"{"code":"200000","data":{"time":1717086399000,"symbol":"NOPE-USDT","last":null,"vol":null,"volValue":null}}"#,
        )
        .unwrap();
        let stats = unwrap_data(response).unwrap();
        assert!(matches!(parse_stats(&stats), Err(ApiError::Malformed(_))));
    }

    #[test]
    fn test_non_success_code_is_protocol_error() {
        let response: KucoinResponse<KucoinStats> =
            decode(br#"{"code":"400100","msg":"Unsupported trading pair."}"#).unwrap();
        match unwrap_data(response) {
            Err(ApiError::Protocol { code, message }) => {
                assert_eq!(code, "400100");
                assert_eq!(message, "Unsupported trading pair.");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_candles_newest_first() {
        let rows: KucoinCandleRows = vec![
            vec!["1717027200", "67500", "68500", "69000", "67000", "120", "8220000"],
            vec!["1716940800", "67000", "67500", "68000", "66000", "100", "6750000"],
        ]
        .into_iter()
        .map(|row| row.into_iter().map(String::from).collect())
        .collect();

        let candles = parse_candles(&rows, 10).unwrap();
        assert_eq!(candles[0].open_time, 1716940800);
        assert_eq!(candles[0].volume, 6750000.0);
        assert_eq!(candles[1].close, 68500.0);
    }
}
