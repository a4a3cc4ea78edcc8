use serde::Deserialize;

/// Response envelope; `code` is "200000" on success
#[derive(Debug, Clone, Deserialize)]
pub struct KucoinResponse<T> {
    pub code: String,
    #[serde(default)]
    pub msg: Option<String>,
    pub data: Option<T>,
}

/// GET /api/v1/market/stats; unknown pairs come back with null fields
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KucoinStats {
    pub symbol: Option<String>,
    pub last: Option<String>,
    pub vol: Option<String>,
    /// 24h turnover in quote currency
    pub vol_value: Option<String>,
}

/// [time, open, close, high, low, volume, turnover], newest first
pub type KucoinCandleRows = Vec<Vec<String>>;
