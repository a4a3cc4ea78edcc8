/// External market-data APIs
///
/// Six exchange adapters share one `TransportPool`. CoinGecko and
/// CryptoCompare supply reference data and headlines.
pub mod adapter;
pub mod client;
pub mod stats;
pub mod symbols;
pub mod types;

pub mod binance;
pub mod bybit;
pub mod coinbase;
pub mod coingecko;
pub mod cryptocompare;
pub mod kraken;
pub mod kucoin;
pub mod okx;

pub use adapter::ExchangeAdapter;
pub use client::{TransportLease, TransportPool};
pub use stats::{ApiStats, ApiStatsTracker};
pub use symbols::{canonical_ticker, SymbolMapper};
pub use types::{DailyCandle, Exchange, Ticker};

use std::sync::Arc;
use std::time::Duration;

/// Build the adapter for one venue on the shared transport
pub fn build_adapter(
    exchange: Exchange,
    transport: Arc<TransportPool>,
    timeout: Duration,
) -> Arc<dyn ExchangeAdapter> {
    match exchange {
        Exchange::Binance => Arc::new(binance::BinanceClient::new(transport, timeout)),
        Exchange::Coinbase => Arc::new(coinbase::CoinbaseClient::new(transport, timeout)),
        Exchange::Kraken => Arc::new(kraken::KrakenClient::new(transport, timeout)),
        Exchange::Kucoin => Arc::new(kucoin::KucoinClient::new(transport, timeout)),
        Exchange::Okx => Arc::new(okx::OkxClient::new(transport, timeout)),
        Exchange::Bybit => Arc::new(bybit::BybitClient::new(transport, timeout)),
    }
}
