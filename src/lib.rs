//! Multi-exchange crypto market-data core
//!
//! Concurrent volume, price and history aggregation across six exchanges,
//! a two-tier TTL cache, technical indicators and a composite sentiment score.

pub mod aggregator;
pub mod apis;
pub mod cache;
pub mod config;
pub mod errors;
pub mod indicators;
pub mod logger;
pub mod sentiment;
pub mod service;

pub use aggregator::{MarketAggregator, MarketSnapshot};
pub use apis::{Exchange, ExchangeAdapter};
pub use service::MarketDataService;
