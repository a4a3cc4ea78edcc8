/// Bybit v5 public market API client
///
/// Endpoints implemented:
/// 1. /v5/market/tickers?category=spot&symbol={pair} - 24h ticker
/// 2. /v5/market/kline?category=spot&symbol={pair}&interval=D&limit={n} - Daily klines

pub mod types;

use self::types::{BybitKlineRow, BybitList, BybitResponse, BybitTicker};
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

const BYBIT_BASE_URL: &str = "https://api.bybit.com";

const MAX_KLINES: u32 = 1000;

const KLINE_START: usize = 0;
const KLINE_CLOSE: usize = 4;
const KLINE_TURNOVER: usize = 6;

pub struct BybitClient {
    transport: Arc<TransportPool>,
    stats: ApiStatsTracker,
    timeout: Duration,
}

impl BybitClient {
    pub fn new(transport: Arc<TransportPool>, timeout: Duration) -> Self {
        Self {
            transport,
            stats: ApiStatsTracker::new(),
            timeout,
        }
    }
}

#[async_trait]
impl ExchangeAdapter for BybitClient {
    fn exchange(&self) -> Exchange {
        Exchange::Bybit
    }

    fn stats(&self) -> &ApiStatsTracker {
        &self.stats
    }

    async fn fetch_ticker(&self, symbol: &str) -> ApiResult<Ticker> {
        let url = format!("{}/v5/market/tickers", BYBIT_BASE_URL);
        let query = [
            ("category", "spot".to_string()),
            ("symbol", self.mapper().pair(symbol)),
        ];

        let response: BybitResponse<BybitList<BybitTicker>> = self
            .transport
            .get_json("market/tickers", &url, &query, self.timeout, &self.stats)
            .await?;

        let list = unwrap_list(response)?;
        let ticker = list
            .first()
            .ok_or_else(|| ApiError::malformed("ticker list is empty"))?;
        parse_ticker(ticker)
    }

    async fn fetch_daily_candles(&self, symbol: &str, days: u32) -> ApiResult<Vec<DailyCandle>> {
        let url = format!("{}/v5/market/kline", BYBIT_BASE_URL);
        let query = [
            ("category", "spot".to_string()),
            ("symbol", self.mapper().pair(symbol)),
            ("interval", "D".to_string()),
            ("limit", days.min(MAX_KLINES).to_string()),
        ];

        let response: BybitResponse<BybitList<BybitKlineRow>> = self
            .transport
            .get_json("market/kline", &url, &query, self.timeout, &self.stats)
            .await?;

        parse_klines(&unwrap_list(response)?, days)
    }
}

fn unwrap_list<T>(response: BybitResponse<BybitList<T>>) -> ApiResult<Vec<T>> {
    if response.ret_code != 0 {
        return Err(ApiError::protocol(response.ret_code, response.ret_msg));
    }
    response
        .result
        .map(|result| result.list)
        .ok_or_else(|| ApiError::malformed("response has no result"))
}

pub fn parse_ticker(raw: &BybitTicker) -> ApiResult<Ticker> {
    Ticker::new(
        parse_decimal(&raw.last_price, "lastPrice")?,
        parse_decimal(&raw.turnover24h, "turnover24h")?,
    )
}

pub fn parse_klines(rows: &[BybitKlineRow], days: u32) -> ApiResult<Vec<DailyCandle>> {
    let candles = rows
        .iter()
        .map(|row| {
            Ok(DailyCandle {
                open_time: normalize_timestamp(string_row_f64(row, KLINE_START, "startTime")? as i64),
                close: string_row_f64(row, KLINE_CLOSE, "close")?,
                volume: string_row_f64(row, KLINE_TURNOVER, "turnover")?,
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
        let response: BybitResponse<BybitList<BybitTicker>> = decode(
            br#"{"retCode":0,"retMsg":"OK","result":{"category":"spot","list":[
                {"symbol":"BTCUSDT","bid1Price":"67000","lastPrice":"67005.5","volume24h":"5000.1","turnover24h":"335000000.9"}
            ]},"time":1717086399000}"#,
        )
        .unwrap();
        let list = unwrap_list(response).unwrap();
        let ticker = parse_ticker(&list[0]).unwrap();
        assert_eq!(ticker.last_price, 67005.5);
        assert_eq!(ticker.quote_volume, 335000000.9);
    }

    fn decodes_as_response<T: serde::de::DeserializeOwned>() {}

    #[test]
    fn test_envelopes_decode_without_default_payload() {
        decodes_as_response::<BybitResponse<BybitList<BybitTicker>>>();
        decodes_as_response::<BybitResponse<BybitList<BybitKlineRow>>>();

        let response: BybitResponse<BybitList<BybitKlineRow>> =
            decode(br#"{"retCode":0,"retMsg":"OK"}"#).unwrap();
        assert!(response.result.is_none());
        assert!(matches!(unwrap_list(response), Err(ApiError::Malformed(_))));
    }

    #[test]
    fn test_error_with_empty_result_is_protocol_error() {
        let response: BybitResponse<BybitList<BybitTicker>> =
            decode(br#"{"retCode":10001,"retMsg":"Not supported symbols","result":{}}"#).unwrap();
        assert!(matches!(
            unwrap_list(response),
            Err(ApiError::Protocol { ref code, .. }) if code == "10001"
        ));
    }

    #[test]
    fn test_parse_klines() {
        let rows: Vec<BybitKlineRow> = vec![
            vec!["1717027200000", "67500", "69000", "67000", "68500", "120", "8220000"],
            vec!["1716940800000", "67000", "68000", "66000", "67500", "100", "6750000"],
        ]
        .into_iter()
        .map(|row| row.into_iter().map(String::from).collect())
        .collect();

        let candles = parse_klines(&rows, 7).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].open_time, 1716940800);
        assert_eq!(candles[1].volume, 8220000.0);
    }

    #[test]
    fn test_non_numeric_turnover_is_malformed() {
        let rows = vec![vec![
            "1717027200000".to_string(),
            "1".into(),
            "1".into(),
            "1".into(),
            "1".into(),
            "1".into(),
            "".into(),
        ]];
        assert!(matches!(parse_klines(&rows, 7), Err(ApiError::Malformed(_))));
    }
}
