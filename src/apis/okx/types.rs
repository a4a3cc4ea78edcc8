use serde::Deserialize;

/// Response envelope; `code` is "0" on success
#[derive(Debug, Clone, Deserialize)]
pub struct OkxResponse<T> {
    pub code: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// GET /api/v5/market/ticker
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxTicker {
    pub inst_id: String,
    pub last: String,
    pub vol24h: String,
    /// For spot instruments this is the 24h quote-currency volume
    pub vol_ccy24h: String,
}

/// [ts, o, h, l, c, vol, volCcy, volCcyQuote, confirm], newest first
pub type OkxCandleRow = Vec<String>;
