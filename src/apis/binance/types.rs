use serde::Deserialize;

/// GET /api/v3/ticker/24hr
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceTicker {
    pub symbol: String,
    pub last_price: String,
    pub volume: String,
    pub quote_volume: String,
}

/// Error body returned with 4xx statuses, e.g. {"code":-1121,"msg":"Invalid symbol."}
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceError {
    pub code: i64,
    pub msg: String,
}
