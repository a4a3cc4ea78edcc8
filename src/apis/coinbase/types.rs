use serde::Deserialize;

/// GET /products/{pair}/stats
#[derive(Debug, Clone, Deserialize)]
pub struct CoinbaseStats {
    pub open: String,
    pub high: String,
    pub low: String,
    pub last: String,
    /// 24h volume in base currency
    pub volume: String,
}

/// Error body, e.g. {"message":"NotFound"}
#[derive(Debug, Clone, Deserialize)]
pub struct CoinbaseError {
    pub message: String,
}
