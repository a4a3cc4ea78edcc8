use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Every Kraken public response: `error` is non-empty on rejection
#[derive(Debug, Clone, Deserialize)]
pub struct KrakenResponse<T> {
    #[serde(default)]
    pub error: Vec<String>,
    pub result: Option<T>,
}

/// Ticker entry keyed by Kraken's internal pair name (e.g. "XXBTZUSD")
#[derive(Debug, Clone, Deserialize)]
pub struct KrakenTicker {
    /// Last trade [price, lot volume]
    pub c: Vec<String>,
    /// Volume [today, last 24h]
    pub v: Vec<String>,
    /// VWAP [today, last 24h]
    pub p: Vec<String>,
}

pub type KrakenTickerResult = HashMap<String, KrakenTicker>;

/// OHLC result: the pair's rows plus a `last` cursor field
pub type KrakenOhlcResult = HashMap<String, Value>;
