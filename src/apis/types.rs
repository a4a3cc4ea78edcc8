/// Exchange-independent market types shared by all adapters
use crate::errors::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The six venues queried by the aggregator, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    Binance,
    Coinbase,
    Kraken,
    Kucoin,
    Okx,
    Bybit,
}

impl Exchange {
    pub const ALL: [Exchange; 6] = [
        Exchange::Binance,
        Exchange::Coinbase,
        Exchange::Kraken,
        Exchange::Kucoin,
        Exchange::Okx,
        Exchange::Bybit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Binance => "binance",
            Exchange::Coinbase => "coinbase",
            Exchange::Kraken => "kraken",
            Exchange::Kucoin => "kucoin",
            Exchange::Okx => "okx",
            Exchange::Bybit => "bybit",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exchange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Exchange::ALL
            .iter()
            .copied()
            .find(|exchange| exchange.as_str() == needle)
            .ok_or_else(|| format!("Unknown exchange: {}", s))
    }
}

/// Normalized 24h ticker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub last_price: f64,
    /// 24h traded volume in quote currency (USD / USDT)
    pub quote_volume: f64,
}

impl Ticker {
    pub fn new(last_price: f64, quote_volume: f64) -> ApiResult<Self> {
        if !last_price.is_finite() || last_price <= 0.0 {
            return Err(ApiError::malformed(format!("invalid last price {}", last_price)));
        }
        if !quote_volume.is_finite() || quote_volume < 0.0 {
            return Err(ApiError::malformed(format!("invalid volume {}", quote_volume)));
        }
        Ok(Self {
            last_price,
            quote_volume,
        })
    }
}

/// One daily bar, normalized to second timestamps and quote-currency volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyCandle {
    /// Bar open time, unix seconds
    pub open_time: i64,
    pub close: f64,
    pub volume: f64,
}

/// Sort oldest→newest, drop duplicate bars and keep the most recent `days`
pub fn finalize_candles(mut candles: Vec<DailyCandle>, days: u32) -> Vec<DailyCandle> {
    candles.sort_by_key(|c| c.open_time);
    candles.dedup_by_key(|c| c.open_time);

    let keep = days as usize;
    if candles.len() > keep {
        candles.drain(..candles.len() - keep);
    }
    candles
}

/// Millisecond timestamps (13 digits) become seconds
pub fn normalize_timestamp(raw: i64) -> i64 {
    if raw > 100_000_000_000 {
        raw / 1000
    } else {
        raw
    }
}

/// Parse a decimal carried as a JSON string ("123.45")
pub fn parse_decimal(raw: &str, field: &str) -> ApiResult<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ApiError::malformed(format!("field '{}' is not a number: {:?}", field, raw)))
}

/// Read a number that may be encoded either as a JSON number or a string
pub fn value_as_f64(value: &Value, field: &str) -> ApiResult<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ApiError::malformed(format!("field '{}' out of range", field))),
        Value::String(s) => parse_decimal(s, field),
        other => Err(ApiError::malformed(format!(
            "field '{}' has unexpected type: {}",
            field, other
        ))),
    }
}

/// Read column `idx` of a candle row
pub fn row_f64(row: &[Value], idx: usize, field: &str) -> ApiResult<f64> {
    let value = row
        .get(idx)
        .ok_or_else(|| ApiError::malformed(format!("candle row missing '{}'", field)))?;
    value_as_f64(value, field)
}

/// Read column `idx` of a candle row whose cells are all strings
pub fn string_row_f64(row: &[String], idx: usize, field: &str) -> ApiResult<f64> {
    let raw = row
        .get(idx)
        .ok_or_else(|| ApiError::malformed(format!("candle row missing '{}'", field)))?;
    parse_decimal(raw, field)
}
