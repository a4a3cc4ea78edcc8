/// Error types for the market-data core
///
/// `ApiError` classifies everything that can go wrong talking to an external
/// HTTP API. Exchange adapters never surface it past their public
/// `fetch_*` methods: every variant collapses into "value unavailable".
///
/// `CacheError` covers the shared cache tier. The two-tier cache swallows it.
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Connection-level failure (DNS, TLS, refused, reset)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request exceeded the per-adapter timeout
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// Non-success HTTP status
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Non-success status embedded in an otherwise valid payload
    #[error("API rejected request (code {code}): {message}")]
    Protocol { code: String, message: String },

    /// Missing or unparsable field in the response
    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("API disabled")]
    Disabled,

    #[error("Transport pool closed")]
    PoolClosed,
}

impl ApiError {
    pub fn malformed(message: impl Into<String>) -> Self {
        ApiError::Malformed(message.into())
    }

    pub fn protocol(code: impl ToString, message: impl Into<String>) -> Self {
        ApiError::Protocol {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Short label used in stats and log lines
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Transport(_) => "transport",
            ApiError::Timeout(_) => "timeout",
            ApiError::HttpStatus { .. } => "http_status",
            ApiError::Protocol { .. } => "protocol",
            ApiError::Malformed(_) => "malformed",
            ApiError::Disabled => "disabled",
            ApiError::PoolClosed => "pool_closed",
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Shared store error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Shared store directory {path}: {source}")]
    Directory {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type CacheResult<T> = Result<T, CacheError>;
