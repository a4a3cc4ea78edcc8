/// Generic in-memory cache with per-entry TTL and LRU eviction
///
/// Thread-safe, generic over key/value types. This is the process-local tier
/// of `TwoTierCache`. Tracks metrics for monitoring.
use super::config::CacheConfig;
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            ttl,
        }
    }

    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() >= self.ttl
    }
}

#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub inserts: u64,
}

impl CacheMetrics {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

pub struct CacheManager<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    config: CacheConfig,
    data: Arc<RwLock<HashMap<K, CacheEntry<V>>>>,
    access_order: Arc<RwLock<VecDeque<K>>>, // front = least recently used
    metrics: Arc<RwLock<CacheMetrics>>,
}

impl<K, V> CacheManager<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            data: Arc::new(RwLock::new(HashMap::new())),
            access_order: Arc::new(RwLock::new(VecDeque::new())),
            metrics: Arc::new(RwLock::new(CacheMetrics::default())),
        }
    }

    /// Get value from cache (None if expired or missing)
    pub fn get(&self, key: &K) -> Option<V> {
        let mut data = self.data.write();

        let expired = match data.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.metrics.write().misses += 1;
                return None;
            }
        };

        if expired {
            data.remove(key);
            self.remove_from_access_order(key);

            let mut metrics = self.metrics.write();
            metrics.misses += 1;
            metrics.expirations += 1;
            return None;
        }

        self.update_access_order(key);
        self.metrics.write().hits += 1;
        data.get(key).map(|entry| entry.value.clone())
    }

    /// Insert with the configured default TTL
    pub fn insert(&self, key: K, value: V) {
        self.insert_with_ttl(key, value, self.config.ttl);
    }

    /// Insert with an explicit TTL (evicts LRU if at capacity)
    pub fn insert_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let mut data = self.data.write();

        if data.len() >= self.config.capacity && !data.contains_key(&key) {
            self.evict_lru(&mut data);
        }

        data.insert(key.clone(), CacheEntry::new(value, ttl));
        self.update_access_order(&key);

        self.metrics.write().inserts += 1;
    }

    pub fn remove(&self, key: &K) {
        self.data.write().remove(key);
        self.remove_from_access_order(key);
    }

    pub fn clear(&self) {
        self.data.write().clear();
        self.access_order.write().clear();
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let mut data = self.data.write();
        let expired: Vec<K> = data
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            data.remove(key);
            self.remove_from_access_order(key);
        }

        self.metrics.write().expirations += expired.len() as u64;
        expired.len()
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.metrics.read().clone()
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evict_lru(&self, data: &mut HashMap<K, CacheEntry<V>>) {
        let mut access_order = self.access_order.write();

        if let Some(lru_key) = access_order.pop_front() {
            data.remove(&lru_key);
            self.metrics.write().evictions += 1;
        }
    }

    fn update_access_order(&self, key: &K) {
        let mut access_order = self.access_order.write();
        access_order.retain(|k| k != key);
        access_order.push_back(key.clone());
    }

    fn remove_from_access_order(&self, key: &K) {
        self.access_order.write().retain(|k| k != key);
    }
}
