use super::headlines::NewsBreakdown;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentCategory {
    Bullish,
    Neutral,
    Bearish,
}

/// Signed contribution of each input before weighting
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentComponents {
    pub news: f64,
    pub rsi: f64,
    pub macd: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReport {
    pub symbol: String,
    pub composite_score: f64,
    pub overall_sentiment: SentimentCategory,
    pub components: SentimentComponents,
    pub news_breakdown: NewsBreakdown,
    /// Community vote balance in [-1, 1]; reported only, not weighted
    pub social_sentiment: f64,
    pub timestamp: DateTime<Utc>,
}
