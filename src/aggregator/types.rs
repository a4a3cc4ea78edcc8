use crate::apis::types::{DailyCandle, Exchange};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry per known exchange, ordered by `Exchange`
pub type ExchangeMap<T> = BTreeMap<Exchange, T>;

/// Map with every known exchange set to `value`
pub fn exchange_map_filled<T: Clone>(value: T) -> ExchangeMap<T> {
    Exchange::ALL.iter().map(|e| (*e, value.clone())).collect()
}

/// Restore any exchange key missing from `map` (e.g. an older cached value)
pub fn complete_exchange_map<T: Clone>(mut map: ExchangeMap<T>, absent: T) -> ExchangeMap<T> {
    for exchange in Exchange::ALL {
        map.entry(exchange).or_insert_with(|| absent.clone());
    }
    map
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub volumes: ExchangeMap<Option<f64>>,
    pub prices: ExchangeMap<Option<f64>>,
    pub captured_at: DateTime<Utc>,
}

impl MarketSnapshot {
    pub fn total_volume(&self) -> f64 {
        self.volumes.values().flatten().sum()
    }

    /// Exchange with the largest reported volume
    pub fn top_exchange(&self) -> Option<Exchange> {
        self.volumes
            .iter()
            .filter_map(|(exchange, volume)| volume.map(|v| (*exchange, v)))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(exchange, _)| exchange)
    }

    pub fn available_count(&self) -> usize {
        self.volumes.values().filter(|v| v.is_some()).count()
    }
}

/// Daily bars of one venue, oldest first; empty when the venue was unavailable
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoricalSeries {
    pub symbol: String,
    pub exchange: Exchange,
    pub days: u32,
    pub candles: Vec<DailyCandle>,
}

impl HistoricalSeries {
    pub fn empty(symbol: &str, exchange: Exchange, days: u32) -> Self {
        Self {
            symbol: symbol.to_string(),
            exchange,
            days,
            candles: Vec::new(),
        }
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArbitrageOpportunity {
    pub buy_exchange: Exchange,
    pub sell_exchange: Exchange,
    pub buy_price: f64,
    pub sell_price: f64,
    pub spread_percentage: f64,
}
