use serde::Deserialize;

/// Response envelope; `retCode` is 0 on success and `result` may be `{}` otherwise
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitResponse<T> {
    pub ret_code: i64,
    #[serde(default)]
    pub ret_msg: String,
    pub result: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BybitList<T> {
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
}

/// Entry of GET /v5/market/tickers?category=spot
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitTicker {
    pub symbol: String,
    pub last_price: String,
    pub volume24h: String,
    /// 24h turnover in quote currency
    pub turnover24h: String,
}

/// [startTime, open, high, low, close, volume, turnover], newest first
pub type BybitKlineRow = Vec<String>;
