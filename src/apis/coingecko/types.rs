use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// GET /search/trending
#[derive(Debug, Clone, Deserialize)]
pub struct TrendingResponse {
    #[serde(default)]
    pub coins: Vec<TrendingEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendingEntry {
    pub item: TrendingCoin,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendingCoin {
    pub id: String,
    pub symbol: String,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
}

/// GET /simple/price?ids=..&vs_currencies=usd → {"bitcoin":{"usd":67000.0}}
pub type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

/// GET /coins/{id}/market_chart
#[derive(Debug, Clone, Deserialize)]
pub struct MarketChartResponse {
    /// [timestamp_ms, price]
    pub prices: Vec<(f64, f64)>,
}

/// Entry of GET /coins/markets; every numeric field can be null for thin coins
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MarketData {
    pub id: String,
    pub symbol: String,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub market_cap_rank: Option<u32>,
    pub total_volume: Option<f64>,
    pub price_change_24h: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
    pub circulating_supply: Option<f64>,
    pub ath: Option<f64>,
    pub ath_change_percentage: Option<f64>,
}

/// GET /global
#[derive(Debug, Clone, Deserialize)]
pub struct GlobalResponse {
    pub data: GlobalData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GlobalData {
    pub market_cap_percentage: HashMap<String, f64>,
}

/// GET /coins/{id} (community section only)
#[derive(Debug, Clone, Deserialize)]
pub struct CoinDetail {
    pub id: String,
    pub sentiment_votes_up_percentage: Option<f64>,
    pub sentiment_votes_down_percentage: Option<f64>,
}

/// One row of the dominance table
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DominanceEntry {
    pub symbol: String,
    pub percentage: f64,
}
