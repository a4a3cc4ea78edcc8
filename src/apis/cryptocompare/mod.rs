/// CryptoCompare news client
///
/// Endpoint: /data/v2/news/?lang=EN&categories={TICKER}

pub mod types;

use self::types::{NewsArticle, NewsResponse};
use crate::apis::client::TransportPool;
use crate::apis::stats::{ApiStats, ApiStatsTracker};
use crate::apis::symbols::canonical_ticker;
use crate::errors::{ApiError, ApiResult};
use crate::sentiment::HeadlineSource;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

const CRYPTOCOMPARE_BASE_URL: &str = "https://min-api.cryptocompare.com";

const SUCCESS_TYPE: i64 = 100;

/// Only the most recent headlines are scored
const MAX_HEADLINES: usize = 50;

pub struct CryptoCompareClient {
    transport: Arc<TransportPool>,
    stats: ApiStatsTracker,
    timeout: Duration,
    enabled: bool,
}

impl CryptoCompareClient {
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

    /// Recent headline titles tagged with the coin's ticker
    pub async fn fetch_headlines(&self, coin: &str) -> ApiResult<Vec<String>> {
        if !self.enabled {
            return Err(ApiError::Disabled);
        }

        let url = format!("{}/data/v2/news/", CRYPTOCOMPARE_BASE_URL);
        let query = [
            ("lang", "EN".to_string()),
            ("categories", canonical_ticker(coin)),
        ];
        let response: NewsResponse = self
            .transport
            .get_json("news", &url, &query, self.timeout, &self.stats)
            .await?;

        parse_headlines(response)
    }
}

#[async_trait]
impl HeadlineSource for CryptoCompareClient {
    async fn headlines(&self, symbol: &str) -> ApiResult<Vec<String>> {
        self.fetch_headlines(symbol).await
    }
}

pub fn parse_headlines(response: NewsResponse) -> ApiResult<Vec<String>> {
    if response.response_type != SUCCESS_TYPE {
        return Err(ApiError::protocol(response.response_type, response.message));
    }

    let mut articles: Vec<NewsArticle> = serde_json::from_value(response.data)
        .map_err(|e| ApiError::malformed(format!("news data: {}", e)))?;
    articles.sort_by(|a, b| b.published_on.cmp(&a.published_on));

    Ok(articles
        .into_iter()
        .map(|article| article.title.trim().to_string())
        .filter(|title| !title.is_empty())
        .take(MAX_HEADLINES)
        .collect())
}
