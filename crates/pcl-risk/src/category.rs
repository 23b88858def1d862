//! Keyword-scored category classification.

/// One of the five parametric-event categories the risk engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Weather,
    CryptoPrice,
    GasFee,
    DefiProtocol,
    OnChainEvent,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Weather => "weather",
            Category::CryptoPrice => "crypto-price",
            Category::GasFee => "gas-fee",
            Category::DefiProtocol => "defi-protocol",
            Category::OnChainEvent => "on-chain-event",
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Category::Weather => &[
                "rain", "rainfall", "snow", "temperature", "weather", "humidity", "wind",
                "storm", "drought", "hurricane",
            ],
            Category::CryptoPrice => &[
                "btc", "bitcoin", "eth", "ethereum", "price", "usd", "usdc", "token", "market cap",
            ],
            Category::GasFee => &["gas", "gwei", "base fee", "priority fee"],
            Category::DefiProtocol => &[
                "tvl", "protocol", "liquidity", "pool", "vault", "defi", "yield", "apr", "apy",
            ],
            Category::OnChainEvent => &[
                "block", "transaction", "validator", "uptime", "downtime", "governance", "vote",
                "upgrade",
            ],
        }
    }
}

const ALL: [Category; 5] = [
    Category::Weather,
    Category::CryptoPrice,
    Category::GasFee,
    Category::DefiProtocol,
    Category::OnChainEvent,
];

/// Score every category by keyword hits in `description` (case-insensitive)
/// and return the top scorer. Ties (including "no category scored any hits")
/// resolve to `CryptoPrice`, its role as the catch-all financial category.
pub fn detect_category(description: &str) -> Category {
    let lower = description.to_ascii_lowercase();
    let scores: Vec<(Category, i32)> = ALL
        .iter()
        .map(|&cat| {
            let score = cat.keywords().iter().filter(|kw| lower.contains(*kw)).count() as i32;
            (cat, score)
        })
        .collect();

    let top_score = scores.iter().map(|(_, s)| *s).max().unwrap_or(0);
    if top_score <= 0 {
        return Category::CryptoPrice;
    }
    if scores
        .iter()
        .any(|(cat, s)| *cat == Category::CryptoPrice && *s == top_score)
    {
        return Category::CryptoPrice;
    }
    scores
        .into_iter()
        .find(|(_, s)| *s == top_score)
        .map(|(cat, _)| cat)
        .unwrap_or(Category::CryptoPrice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_weather_from_keywords() {
        assert_eq!(
            detect_category("Will it rain more than 10mm in Austin tomorrow?"),
            Category::Weather
        );
    }

    #[test]
    fn detects_gas_fee() {
        assert_eq!(
            detect_category("Will base fee exceed 200 gwei this week?"),
            Category::GasFee
        );
    }

    #[test]
    fn ties_resolve_to_crypto_price() {
        assert_eq!(detect_category("something ambiguous"), Category::CryptoPrice);
    }
}
