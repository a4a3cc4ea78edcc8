/// Per-client request statistics
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ApiStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// Calls that ended "unavailable" for any reason (transport, status, payload)
    pub unavailable_results: u64,
    pub average_latency_ms: f64,
    pub last_error: Option<String>,
    pub last_error_at: Option<DateTime<Utc>>,
}

impl ApiStats {
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.successful_requests as f64 / self.total_requests as f64
        }
    }
}

#[derive(Default)]
pub struct ApiStatsTracker {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    unavailable_results: AtomicU64,
    total_latency_ms: Mutex<f64>,
    last_error: Mutex<Option<(String, DateTime<Utc>)>>,
}

impl ApiStatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_request(&self, success: bool, elapsed_ms: f64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
        *self.total_latency_ms.lock().await += elapsed_ms;
    }

    pub async fn record_error(&self, operation: &str, message: String) {
        self.unavailable_results.fetch_add(1, Ordering::Relaxed);
        *self.last_error.lock().await = Some((format!("{}: {}", operation, message), Utc::now()));
    }

    pub async fn get_stats(&self) -> ApiStats {
        let total = self.total_requests.load(Ordering::Relaxed);
        let latency = *self.total_latency_ms.lock().await;
        let last_error = self.last_error.lock().await.clone();

        ApiStats {
            total_requests: total,
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            unavailable_results: self.unavailable_results.load(Ordering::Relaxed),
            average_latency_ms: if total == 0 { 0.0 } else { latency / total as f64 },
            last_error_at: last_error.as_ref().map(|(_, at)| *at),
            last_error: last_error.map(|(message, _)| message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stats_accumulate() {
        let tracker = ApiStatsTracker::new();
        tracker.record_request(true, 100.0).await;
        tracker.record_request(false, 300.0).await;
        tracker.record_error("volume", "HTTP 503: busy".to_string()).await;

        let stats = tracker.get_stats().await;
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.successful_requests, 1);
        assert_eq!(stats.failed_requests, 1);
        assert_eq!(stats.unavailable_results, 1);
        assert!((stats.average_latency_ms - 200.0).abs() < 1e-9);
        assert!((stats.success_rate() - 0.5).abs() < 1e-9);
        assert_eq!(stats.last_error.as_deref(), Some("volume: HTTP 503: busy"));
        assert!(stats.last_error_at.is_some());
    }
}
