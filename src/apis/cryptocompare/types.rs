use serde::Deserialize;
use serde_json::Value;

/// GET /data/v2/news/; `Type` is 100 on success, the message explains failures
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewsResponse {
    #[serde(rename = "Type")]
    pub response_type: i64,
    #[serde(default)]
    pub message: String,
    /// Article list on success; error responses carry `{}` here
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub published_on: i64,
    #[serde(default)]
    pub categories: String,
}
