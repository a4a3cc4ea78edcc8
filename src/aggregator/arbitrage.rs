use super::types::{ArbitrageOpportunity, ExchangeMap};

/// Every venue pair whose price gap exceeds `min_spread_pct`, widest spread first.
/// Buy on the cheaper venue, sell on the dearer one.
pub fn find_arbitrage(
    prices: &ExchangeMap<Option<f64>>,
    min_spread_pct: f64,
) -> Vec<ArbitrageOpportunity> {
    let quoted: Vec<_> = prices
        .iter()
        .filter_map(|(exchange, price)| match price {
            Some(p) if p.is_finite() && *p > 0.0 => Some((*exchange, *p)),
            _ => None,
        })
        .collect();

    let mut opportunities = Vec::new();
    for (i, &(first, first_price)) in quoted.iter().enumerate() {
        for &(second, second_price) in &quoted[i + 1..] {
            let (buy_exchange, buy_price, sell_exchange, sell_price) = if first_price <= second_price {
                (first, first_price, second, second_price)
            } else {
                (second, second_price, first, first_price)
            };

            let spread_percentage = (sell_price - buy_price) / buy_price * 100.0;
            if spread_percentage > min_spread_pct {
                opportunities.push(ArbitrageOpportunity {
                    buy_exchange,
                    sell_exchange,
                    buy_price,
                    sell_price,
                    spread_percentage,
                });
            }
        }
    }

    opportunities.sort_by(|a, b| b.spread_percentage.total_cmp(&a.spread_percentage));
    opportunities
}
