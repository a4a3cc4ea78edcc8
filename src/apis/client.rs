/// Shared HTTP transport
///
/// One pooled `reqwest::Client` for the whole process. Concurrency is bounded
/// by a semaphore: callers `lease()` the transport and the permit is released
/// when the `TransportLease` drops.
use super::stats::ApiStatsTracker;
use crate::errors::{ApiError, ApiResult};
use crate::logger::{self, LogTag};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::ops::Deref;
use std::time::{Duration, Instant};
use tokio::sync::{Semaphore, SemaphorePermit};

pub const USER_AGENT: &str = concat!("crypto-volume/", env!("CARGO_PKG_VERSION"));

/// Connection establishment timeout (the request timeout is per adapter)
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Bodies longer than this are truncated in error messages
const MAX_ERROR_BODY_CHARS: usize = 200;

pub struct TransportPool {
    client: Client,
    permits: Semaphore,
    max_concurrent: usize,
}

/// Scoped borrow of the shared client; releases its permit on drop
pub struct TransportLease<'a> {
    client: &'a Client,
    _permit: SemaphorePermit<'a>,
}

impl Deref for TransportLease<'_> {
    type Target = Client;

    fn deref(&self) -> &Client {
        self.client
    }
}

impl TransportPool {
    pub fn new(max_concurrent: usize) -> Result<Self, String> {
        let max_concurrent = max_concurrent.max(1);
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .pool_max_idle_per_host(max_concurrent)
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            permits: Semaphore::new(max_concurrent),
            max_concurrent,
        })
    }

    /// Wait for a free slot and borrow the client
    pub async fn lease(&self) -> ApiResult<TransportLease<'_>> {
        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ApiError::PoolClosed)?;

        Ok(TransportLease {
            client: &self.client,
            _permit: permit,
        })
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// GET `url` with `query`, classify failures and decode the JSON body
    pub async fn get_json<T>(
        &self,
        endpoint: &str,
        url: &str,
        query: &[(&str, String)],
        timeout: Duration,
        stats: &ApiStatsTracker,
    ) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let lease = self.lease().await?;
        let start = Instant::now();

        logger::debug(LogTag::Api, &format!("GET {} {:?}", url, query));

        let sent = lease
            .get(url)
            .query(query)
            .header("Accept", "application/json")
            .timeout(timeout)
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                stats.record_request(false, elapsed_ms(start)).await;
                return Err(classify_transport_error(&e, timeout));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            stats.record_request(false, elapsed_ms(start)).await;
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                stats.record_request(false, elapsed_ms(start)).await;
                return Err(classify_transport_error(&e, timeout));
            }
        };
        drop(lease);

        match decode::<T>(&bytes) {
            Ok(value) => {
                stats.record_request(true, elapsed_ms(start)).await;
                Ok(value)
            }
            Err(e) => {
                stats.record_request(false, elapsed_ms(start)).await;
                logger::debug(
                    LogTag::Api,
                    &format!("Undecodable body from {}: {}", endpoint, e),
                );
                Err(e)
            }
        }
    }
}

/// Decode a JSON body; any shape mismatch is a malformed payload
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    serde_json::from_slice::<T>(body).map_err(|e| ApiError::malformed(e.to_string()))
}

/// Percent-encode a value that is embedded in a URL path
pub fn encode_path_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

fn classify_transport_error(error: &reqwest::Error, timeout: Duration) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout(timeout)
    } else {
        ApiError::Transport(error.to_string())
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max_chars).collect();
        cut.push('…');
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[allow(dead_code)]
        price: String,
    }

    #[tokio::test]
    async fn test_lease_releases_permit_on_drop() {
        let pool = TransportPool::new(2).unwrap();
        assert_eq!(pool.available_permits(), 2);
        {
            let _a = pool.lease().await.unwrap();
            let _b = pool.lease().await.unwrap();
            assert_eq!(pool.available_permits(), 0);
        }
        assert_eq!(pool.available_permits(), 2);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let pool = TransportPool::new(0).unwrap();
        assert_eq!(pool.max_concurrent(), 1);
    }

    #[test]
    fn test_decode_missing_field_is_malformed() {
        let err = decode::<Probe>(br#"{"volume":"1"}"#).unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
        assert!(decode::<Probe>(br#"{"price":"1"}"#).is_ok());
        assert!(matches!(decode::<Probe>(b"<html>"), Err(ApiError::Malformed(_))));
    }

    #[test]
    fn test_encode_path_segment() {
        assert_eq!(encode_path_segment("BTC-USD"), "BTC-USD");
        assert_eq!(encode_path_segment("a b/c"), "a%20b%2Fc");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc…");
    }
}
