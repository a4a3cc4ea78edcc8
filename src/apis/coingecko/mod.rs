/// CoinGecko API client
///
/// API Documentation: https://docs.coingecko.com/reference/introduction
///
/// Endpoints implemented:
/// 1. /search/trending - Trending coin ids
/// 2. /simple/price - Spot USD price
/// 3. /coins/{id}/market_chart - Daily USD price history
/// 4. /coins/markets - Market cap, rank, supply, ATH
/// 5. /global - Market-cap dominance per asset
/// 6. /coins/{id} - Community sentiment votes

pub mod types;

use self::types::{
    CoinDetail, DominanceEntry, GlobalResponse, MarketChartResponse, MarketData,
    SimplePriceResponse, TrendingResponse,
};
use crate::apis::client::{encode_path_segment, TransportPool};
use crate::apis::stats::{ApiStats, ApiStatsTracker};
use crate::apis::symbols::coingecko_id;
use crate::errors::{ApiError, ApiResult};
use crate::sentiment::SocialSentimentSource;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// API CONFIGURATION
// ============================================================================

const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

const VS_CURRENCY: &str = "usd";

// ============================================================================
// CLIENT IMPLEMENTATION
// ============================================================================

pub struct CoinGeckoClient {
    transport: Arc<TransportPool>,
    stats: ApiStatsTracker,
    timeout: Duration,
    enabled: bool,
}

impl CoinGeckoClient {
    pub fn new(transport: Arc<TransportPool>, timeout: Duration, enabled: bool) -> Self {
        Self {
            transport,
            stats: ApiStatsTracker::new(),
            timeout,
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn get_stats(&self) -> ApiStats {
        self.stats.get_stats().await
    }

    async fn get<T>(&self, endpoint: &str, path: &str, query: &[(&str, String)]) -> ApiResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        if !self.enabled {
            return Err(ApiError::Disabled);
        }
        let url = format!("{}{}", COINGECKO_BASE_URL, path);
        self.transport
            .get_json(endpoint, &url, query, self.timeout, &self.stats)
            .await
    }

    /// Ids of the coins currently trending on CoinGecko
    pub async fn fetch_trending(&self) -> ApiResult<Vec<String>> {
        let response: TrendingResponse = self.get("search/trending", "/search/trending", &[]).await?;
        Ok(response.coins.into_iter().map(|entry| entry.item.id).collect())
    }

    /// Spot USD price for a slug or ticker
    pub async fn fetch_price(&self, coin: &str) -> ApiResult<f64> {
        let id = coingecko_id(coin);
        let query = [("ids", id.clone()), ("vs_currencies", VS_CURRENCY.to_string())];
        let response: SimplePriceResponse = self.get("simple/price", "/simple/price", &query).await?;
        parse_simple_price(&response, &id)
    }

    /// Daily USD prices, oldest first
    pub async fn fetch_price_history(&self, coin: &str, days: u32) -> ApiResult<Vec<f64>> {
        let path = format!(
            "/coins/{}/market_chart",
            encode_path_segment(&coingecko_id(coin))
        );
        let query = [
            ("vs_currency", VS_CURRENCY.to_string()),
            ("days", days.max(1).to_string()),
            ("interval", "daily".to_string()),
        ];
        let response: MarketChartResponse = self.get("market_chart", &path, &query).await?;
        Ok(parse_price_history(&response))
    }

    pub async fn fetch_market_data(&self, coin: &str) -> ApiResult<MarketData> {
        let id = coingecko_id(coin);
        let query = [("vs_currency", VS_CURRENCY.to_string()), ("ids", id.clone())];
        let rows: Vec<MarketData> = self.get("coins/markets", "/coins/markets", &query).await?;
        rows.into_iter()
            .find(|row| row.id == id)
            .ok_or_else(|| ApiError::malformed(format!("no market data for '{}'", id)))
    }

    /// Market-cap share per asset, largest first
    pub async fn fetch_market_dominance(&self) -> ApiResult<Vec<DominanceEntry>> {
        let response: GlobalResponse = self.get("global", "/global", &[]).await?;
        Ok(parse_dominance(&response))
    }

    /// Community vote balance `(up% - down%) / 100`, in [-1, 1]
    pub async fn fetch_social_sentiment(&self, coin: &str) -> ApiResult<f64> {
        let path = format!("/coins/{}", encode_path_segment(&coingecko_id(coin)));
        let query = [
            ("localization", "false".to_string()),
            ("tickers", "false".to_string()),
            ("market_data", "false".to_string()),
            ("community_data", "true".to_string()),
            ("developer_data", "false".to_string()),
        ];
        let detail: CoinDetail = self.get("coins/detail", &path, &query).await?;
        parse_vote_balance(&detail)
    }
}

#[async_trait]
impl SocialSentimentSource for CoinGeckoClient {
    async fn social_score(&self, symbol: &str) -> ApiResult<f64> {
        self.fetch_social_sentiment(symbol).await
    }
}

// ============================================================================
// RESPONSE PARSING
// ============================================================================

pub fn parse_simple_price(response: &SimplePriceResponse, id: &str) -> ApiResult<f64> {
    response
        .get(id)
        .and_then(|prices| prices.get(VS_CURRENCY))
        .copied()
        .filter(|price| price.is_finite() && *price > 0.0)
        .ok_or_else(|| ApiError::malformed(format!("no USD price for '{}'", id)))
}

pub fn parse_price_history(response: &MarketChartResponse) -> Vec<f64> {
    let mut points = response.prices.clone();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    points
        .into_iter()
        .map(|(_, price)| price)
        .filter(|price| price.is_finite())
        .collect()
}

pub fn parse_dominance(response: &GlobalResponse) -> Vec<DominanceEntry> {
    let mut entries: Vec<DominanceEntry> = response
        .data
        .market_cap_percentage
        .iter()
        .map(|(symbol, percentage)| DominanceEntry {
            symbol: symbol.to_uppercase(),
            percentage: *percentage,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.percentage
            .total_cmp(&a.percentage)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    entries
}

pub fn parse_vote_balance(detail: &CoinDetail) -> ApiResult<f64> {
    match (
        detail.sentiment_votes_up_percentage,
        detail.sentiment_votes_down_percentage,
    ) {
        (Some(up), Some(down)) => Ok(((up - down) / 100.0).clamp(-1.0, 1.0)),
        _ => Err(ApiError::malformed(format!(
            "no sentiment votes for '{}'",
            detail.id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::client::decode;

    #[test]
    fn test_parse_trending() {
        let response: TrendingResponse = decode(
            br#"{"coins":[{"item":{"id":"pepe","coin_id":1,"symbol":"PEPE","market_cap_rank":30}},{"item":{"id":"bitcoin","symbol":"BTC"}}]}"#,
        )
        .unwrap();
        let ids: Vec<String> = response.coins.into_iter().map(|c| c.item.id).collect();
        assert_eq!(ids, vec!["pepe", "bitcoin"]);
    }

    #[test]
    fn test_parse_simple_price() {
        let response: SimplePriceResponse = decode(br#"{"bitcoin":{"usd":67123.5}}"#).unwrap();
        assert_eq!(parse_simple_price(&response, "bitcoin").unwrap(), 67123.5);

        let empty: SimplePriceResponse = decode(b"{}").unwrap();
        assert!(matches!(
            parse_simple_price(&empty, "notacoin"),
            Err(ApiError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_price_history_sorts() {
        let response: MarketChartResponse = decode(
            br#"{"prices":[[1717113600000,68000.0],[1717027200000,67000.0]],"market_caps":[],"total_volumes":[]}"#,
        )
        .unwrap();
        assert_eq!(parse_price_history(&response), vec![67000.0, 68000.0]);
    }

    #[test]
    fn test_parse_dominance_sorted_descending() {
        let response: GlobalResponse = decode(
            br#"{"data":{"active_cryptocurrencies":10000,"market_cap_percentage":{"eth":16.2,"btc":52.8,"usdt":4.1}}}"#,
        )
        .unwrap();
        let entries = parse_dominance(&response);
        assert_eq!(entries[0].symbol, "BTC");
        assert_eq!(entries[1].symbol, "ETH");
        assert_eq!(entries[2].percentage, 4.1);
    }

    #[test]
    fn test_vote_balance() {
        let detail: CoinDetail = decode(
            br#"{"id":"bitcoin","sentiment_votes_up_percentage":72.5,"sentiment_votes_down_percentage":27.5}"#,
        )
        .unwrap();
        assert!((parse_vote_balance(&detail).unwrap() - 0.45).abs() < 1e-9);

        let missing: CoinDetail =
            decode(br#"{"id":"bitcoin","sentiment_votes_up_percentage":null}"#).unwrap();
        assert!(parse_vote_balance(&missing).is_err());
    }

    #[test]
    fn test_market_data_tolerates_nulls() {
        let rows: Vec<MarketData> = decode(
            br#"[{"id":"bitcoin","symbol":"btc","current_price":67000,"market_cap":1.3e12,"market_cap_rank":1,"total_volume":2.5e10,"price_change_24h":-120.5,"price_change_percentage_24h":-0.18,"circulating_supply":19700000,"ath":73738,"ath_change_percentage":-9.1},
                 {"id":"thin","symbol":"thn","current_price":null,"market_cap":null,"market_cap_rank":null,"total_volume":null,"price_change_24h":null,"price_change_percentage_24h":null,"circulating_supply":null,"ath":null,"ath_change_percentage":null}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].market_cap_rank, Some(1));
        assert_eq!(rows[1].ath, None);
    }

    #[tokio::test]
    async fn test_disabled_client_short_circuits() {
        let transport = Arc::new(TransportPool::new(1).unwrap());
        let client = CoinGeckoClient::new(transport, Duration::from_secs(1), false);
        assert!(matches!(client.fetch_trending().await, Err(ApiError::Disabled)));
        assert!(matches!(
            client.social_score("bitcoin").await,
            Err(ApiError::Disabled)
        ));
    }
}
