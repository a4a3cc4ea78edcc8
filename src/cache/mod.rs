//! Two-tier TTL cache
//!
//! - Local tier: `CacheManager` in process memory (fast, per-process)
//! - Shared tier: optional `SharedStore` holding JSON, visible to other processes
//!
//! `get` checks local first, then shared. A shared hit is returned as-is and
//! is NOT copied back into the local tier, so the tiers are not kept coherent.
//! `set` always writes local; the shared write is best-effort and its failures
//! are logged and swallowed. A value may be stale by up to either tier's TTL.

pub mod config;
pub mod manager;
pub mod shared;

pub use config::{CacheConfig, CacheTtls};
pub use manager::{CacheManager, CacheMetrics};
pub use shared::{SharedStore, SqliteSharedStore};

use crate::logger::{self, LogTag};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub struct TwoTierCache {
    local: CacheManager<String, Value>,
    shared: Option<Arc<dyn SharedStore>>,
}

impl TwoTierCache {
    /// Cache without a shared tier
    pub fn local_only(config: CacheConfig) -> Self {
        Self {
            local: CacheManager::new(config),
            shared: None,
        }
    }

    pub fn with_shared(config: CacheConfig, shared: Arc<dyn SharedStore>) -> Self {
        Self {
            local: CacheManager::new(config),
            shared: Some(shared),
        }
    }

    pub fn has_shared_tier(&self) -> bool {
        self.shared.is_some()
    }

    /// Direct access to the local tier
    pub fn local(&self) -> &CacheManager<String, Value> {
        &self.local
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if let Some(value) = self.local.get(&key.to_string()) {
            match serde_json::from_value::<T>(value) {
                Ok(decoded) => return Some(decoded),
                Err(e) => logger::debug(
                    LogTag::Cache,
                    &format!("Local entry {} has unexpected shape: {}", key, e),
                ),
            }
        }

        let shared = self.shared.as_ref()?;
        match shared.get_raw(key) {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(decoded) => {
                    logger::debug(LogTag::Cache, &format!("Shared tier hit for {}", key));
                    Some(decoded)
                }
                Err(e) => {
                    logger::debug(
                        LogTag::Cache,
                        &format!("Shared entry {} could not be decoded: {}", key, e),
                    );
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                logger::warning(
                    LogTag::Cache,
                    &format!("Shared tier read failed for {}: {}", key, e),
                );
                None
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let json = match serde_json::to_value(value) {
            Ok(json) => json,
            Err(e) => {
                logger::warning(
                    LogTag::Cache,
                    &format!("Value for {} is not serializable: {}", key, e),
                );
                return;
            }
        };

        if let Some(shared) = &self.shared {
            let written = serde_json::to_string(&json)
                .map_err(Into::into)
                .and_then(|raw| shared.put_raw(key, &raw, ttl));
            if let Err(e) = written {
                logger::warning(
                    LogTag::Cache,
                    &format!("Shared tier write failed for {} (ignored): {}", key, e),
                );
            }
        }

        self.local.insert_with_ttl(key.to_string(), json, ttl);
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.local.metrics()
    }
}
