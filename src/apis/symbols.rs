/// Coin identifier normalization
///
/// Callers may pass either a CoinGecko-style slug ("bitcoin") or a ticker
/// ("BTC"). Everything is first reduced to a canonical uppercase ticker, then
/// each venue renders it into its own pair notation.
use super::types::Exchange;

// ============================================================================
// SLUG TABLE
// ============================================================================

/// slug → ticker; the first entry for a ticker is its preferred CoinGecko id
const SLUG_TICKERS: &[(&str, &str)] = &[
    ("bitcoin", "BTC"),
    ("ethereum", "ETH"),
    ("solana", "SOL"),
    ("binancecoin", "BNB"),
    ("ripple", "XRP"),
    ("cardano", "ADA"),
    ("dogecoin", "DOGE"),
    ("tron", "TRX"),
    ("polkadot", "DOT"),
    ("litecoin", "LTC"),
    ("chainlink", "LINK"),
    ("avalanche-2", "AVAX"),
    ("avalanche", "AVAX"),
    ("matic-network", "MATIC"),
    ("polygon", "MATIC"),
    ("shiba-inu", "SHIB"),
    ("uniswap", "UNI"),
    ("stellar", "XLM"),
    ("cosmos", "ATOM"),
    ("monero", "XMR"),
    ("bitcoin-cash", "BCH"),
    ("near", "NEAR"),
    ("aptos", "APT"),
    ("arbitrum", "ARB"),
    ("tether", "USDT"),
    ("usd-coin", "USDC"),
];

/// Kraken still lists a few assets under their legacy ISO-style codes
const KRAKEN_RENAMES: &[(&str, &str)] = &[("BTC", "XBT"), ("DOGE", "XDG")];

/// Reduce a slug or ticker to the canonical uppercase ticker
pub fn canonical_ticker(input: &str) -> String {
    let trimmed = input.trim();
    let lowered = trimmed.to_lowercase();

    SLUG_TICKERS
        .iter()
        .find(|(slug, _)| *slug == lowered)
        .map(|(_, ticker)| ticker.to_string())
        .unwrap_or_else(|| trimmed.to_uppercase())
}

/// CoinGecko coin id for a slug or ticker; unknown tickers pass through lowercased
pub fn coingecko_id(input: &str) -> String {
    let ticker = canonical_ticker(input);
    SLUG_TICKERS
        .iter()
        .find(|(_, t)| *t == ticker)
        .map(|(slug, _)| slug.to_string())
        .unwrap_or_else(|| input.trim().to_lowercase())
}

/// 2 to 32 ASCII alphanumerics, dashes allowed for slugs
pub fn is_valid_coin_symbol(input: &str) -> bool {
    let trimmed = input.trim();
    (2..=32).contains(&trimmed.len())
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        && trimmed.chars().any(|c| c.is_ascii_alphanumeric())
}

pub fn is_known_exchange(name: &str) -> bool {
    name.parse::<Exchange>().is_ok()
}

// ============================================================================
// PER-VENUE MAPPING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolMapper {
    Binance,
    Coinbase,
    Kraken,
    Kucoin,
    Okx,
    Bybit,
}

impl SymbolMapper {
    pub fn for_exchange(exchange: Exchange) -> Self {
        match exchange {
            Exchange::Binance => SymbolMapper::Binance,
            Exchange::Coinbase => SymbolMapper::Coinbase,
            Exchange::Kraken => SymbolMapper::Kraken,
            Exchange::Kucoin => SymbolMapper::Kucoin,
            Exchange::Okx => SymbolMapper::Okx,
            Exchange::Bybit => SymbolMapper::Bybit,
        }
    }

    fn quote(&self) -> &'static str {
        match self {
            SymbolMapper::Coinbase | SymbolMapper::Kraken => "USD",
            _ => "USDT",
        }
    }

    fn separator(&self) -> &'static str {
        match self {
            SymbolMapper::Coinbase | SymbolMapper::Kucoin | SymbolMapper::Okx => "-",
            _ => "",
        }
    }

    /// Venue-specific base asset code
    pub fn map(&self, symbol: &str) -> String {
        let ticker = canonical_ticker(symbol);
        if *self == SymbolMapper::Kraken {
            if let Some((_, renamed)) = KRAKEN_RENAMES.iter().find(|(from, _)| *from == ticker) {
                return renamed.to_string();
            }
        }
        ticker
    }

    /// Full trading pair against the venue's USD-like quote
    pub fn pair(&self, symbol: &str) -> String {
        format!("{}{}{}", self.map(symbol), self.separator(), self.quote())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_ticker() {
        assert_eq!(canonical_ticker("bitcoin"), "BTC");
        assert_eq!(canonical_ticker("Ethereum "), "ETH");
        assert_eq!(canonical_ticker("btc"), "BTC");
        assert_eq!(canonical_ticker("pepe"), "PEPE");
    }

    #[test]
    fn test_pairs_per_venue() {
        assert_eq!(SymbolMapper::Binance.pair("bitcoin"), "BTCUSDT");
        assert_eq!(SymbolMapper::Coinbase.pair("bitcoin"), "BTC-USD");
        assert_eq!(SymbolMapper::Kraken.pair("bitcoin"), "XBTUSD");
        assert_eq!(SymbolMapper::Kraken.pair("dogecoin"), "XDGUSD");
        assert_eq!(SymbolMapper::Kraken.pair("ETH"), "ETHUSD");
        assert_eq!(SymbolMapper::Kucoin.pair("solana"), "SOL-USDT");
        assert_eq!(SymbolMapper::Okx.pair("eth"), "ETH-USDT");
        assert_eq!(SymbolMapper::Bybit.pair("BTC"), "BTCUSDT");
    }

    #[test]
    fn test_slug_and_ticker_agree() {
        for exchange in Exchange::ALL {
            let mapper = SymbolMapper::for_exchange(exchange);
            assert_eq!(mapper.pair("bitcoin"), mapper.pair("BTC"));
        }
    }

    #[test]
    fn test_coingecko_id() {
        assert_eq!(coingecko_id("BTC"), "bitcoin");
        assert_eq!(coingecko_id("bitcoin"), "bitcoin");
        assert_eq!(coingecko_id("AVAX"), "avalanche-2");
        assert_eq!(coingecko_id("Pepe"), "pepe");
    }

    #[test]
    fn test_validation_helpers() {
        assert!(is_valid_coin_symbol("BTC"));
        assert!(is_valid_coin_symbol("shiba-inu"));
        assert!(!is_valid_coin_symbol(""));
        assert!(!is_valid_coin_symbol("   "));
        assert!(!is_valid_coin_symbol("X"));
        assert!(!is_valid_coin_symbol("BTC&x=1"));
        assert!(is_known_exchange("Kraken"));
        assert!(!is_known_exchange("ftx"));
    }
}
