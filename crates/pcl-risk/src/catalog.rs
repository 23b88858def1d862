//! Fixed insurance product catalog, consulted by commerce-job matching and
//! by the controller's pool-creation step (round-robin/weighted pick).
//!
//! Grounded on `mqk-promotion`'s static threshold-table style and
//! `mqk-strategy::plugin_registry`'s const-array registry pattern.

use crate::category::Category;

/// One catalog entry. All fields are static data; nothing here is mutated
/// at runtime.
#[derive(Debug, Clone, Copy)]
pub struct Product {
    pub id: &'static str,
    pub category: Category,
    pub display_name: &'static str,
    pub suggested_coverage_min: u64,
    pub suggested_coverage_max: u64,
    pub suggested_deadline_days_min: u32,
    pub suggested_deadline_days_max: u32,
    pub base_failure_probability: f64,
    pub evidence_source_url: &'static str,
    pub keywords: &'static [&'static str],
}

pub const CATALOG: &[Product] = &[
    Product {
        id: "seattle-rain-exceedance",
        category: Category::Weather,
        display_name: "Seattle daily rainfall exceedance",
        suggested_coverage_min: 50,
        suggested_coverage_max: 2_000,
        suggested_deadline_days_min: 3,
        suggested_deadline_days_max: 30,
        base_failure_probability: 0.34,
        evidence_source_url: "https://api.weather.gov/stations/KSEA/observations",
        keywords: &["seattle", "rain", "rainfall", "pnw"],
    },
    Product {
        id: "miami-hurricane-season",
        category: Category::Weather,
        display_name: "Miami named-storm landfall",
        suggested_coverage_min: 200,
        suggested_coverage_max: 10_000,
        suggested_deadline_days_min: 14,
        suggested_deadline_days_max: 90,
        base_failure_probability: 0.18,
        evidence_source_url: "https://www.nhc.noaa.gov/index-at.xml",
        keywords: &["miami", "hurricane", "storm", "landfall"],
    },
    Product {
        id: "btc-weekly-drawdown",
        category: Category::CryptoPrice,
        display_name: "BTC weekly drawdown protection",
        suggested_coverage_min: 100,
        suggested_coverage_max: 50_000,
        suggested_deadline_days_min: 7,
        suggested_deadline_days_max: 30,
        base_failure_probability: 0.08,
        evidence_source_url: "https://api.coingecko.com/api/v3/coins/bitcoin/market_chart",
        keywords: &["btc", "bitcoin", "drawdown", "price"],
    },
    Product {
        id: "eth-weekly-rally",
        category: Category::CryptoPrice,
        display_name: "ETH weekly rally protection",
        suggested_coverage_min: 100,
        suggested_coverage_max: 50_000,
        suggested_deadline_days_min: 7,
        suggested_deadline_days_max: 30,
        base_failure_probability: 0.08,
        evidence_source_url: "https://api.coingecko.com/api/v3/coins/ethereum/market_chart",
        keywords: &["eth", "ethereum", "rally", "price"],
    },
    Product {
        id: "mainnet-gas-spike",
        category: Category::GasFee,
        display_name: "Ethereum mainnet gas-spike protection",
        suggested_coverage_min: 25,
        suggested_coverage_max: 5_000,
        suggested_deadline_days_min: 1,
        suggested_deadline_days_max: 14,
        base_failure_probability: 0.20,
        evidence_source_url: "https://etherscan.io/gastracker",
        keywords: &["gas", "gwei", "base fee", "mainnet"],
    },
    Product {
        id: "l2-gas-spike",
        category: Category::GasFee,
        display_name: "L2 sequencer gas-spike protection",
        suggested_coverage_min: 25,
        suggested_coverage_max: 5_000,
        suggested_deadline_days_min: 1,
        suggested_deadline_days_max: 14,
        base_failure_probability: 0.10,
        evidence_source_url: "https://l2fees.info",
        keywords: &["l2", "rollup", "sequencer", "gas"],
    },
    Product {
        id: "defi-tvl-drop",
        category: Category::DefiProtocol,
        display_name: "Protocol TVL-drop protection",
        suggested_coverage_min: 100,
        suggested_coverage_max: 20_000,
        suggested_deadline_days_min: 7,
        suggested_deadline_days_max: 60,
        base_failure_probability: 0.05,
        evidence_source_url: "https://api.llama.fi/protocols",
        keywords: &["tvl", "protocol", "defi", "liquidity"],
    },
    Product {
        id: "stablecoin-depeg",
        category: Category::DefiProtocol,
        display_name: "Stablecoin depeg protection",
        suggested_coverage_min: 100,
        suggested_coverage_max: 20_000,
        suggested_deadline_days_min: 7,
        suggested_deadline_days_max: 60,
        base_failure_probability: 0.03,
        evidence_source_url: "https://api.coingecko.com/api/v3/simple/price",
        keywords: &["depeg", "stablecoin", "usdc", "usdt", "dai"],
    },
    Product {
        id: "validator-uptime",
        category: Category::OnChainEvent,
        display_name: "Validator uptime shortfall protection",
        suggested_coverage_min: 50,
        suggested_coverage_max: 10_000,
        suggested_deadline_days_min: 7,
        suggested_deadline_days_max: 90,
        base_failure_probability: 0.06,
        evidence_source_url: "https://beaconcha.in",
        keywords: &["validator", "uptime", "downtime", "slashing"],
    },
    Product {
        id: "governance-vote-outcome",
        category: Category::OnChainEvent,
        display_name: "Governance vote outcome protection",
        suggested_coverage_min: 50,
        suggested_coverage_max: 10_000,
        suggested_deadline_days_min: 3,
        suggested_deadline_days_max: 30,
        base_failure_probability: 0.10,
        evidence_source_url: "https://www.tally.xyz",
        keywords: &["governance", "vote", "proposal", "dao"],
    },
];

/// Keyword-match a free-text description/protocol name to a catalog product.
/// Returns the first catalog entry with the most keyword hits; `None` if no
/// entry matches at all.
pub fn match_product(text: &str) -> Option<&'static Product> {
    let lower = text.to_ascii_lowercase();
    CATALOG
        .iter()
        .map(|p| {
            let score = p.keywords.iter().filter(|kw| lower.contains(*kw)).count();
            (p, score)
        })
        .filter(|(_, score)| *score > 0)
        .max_by_key(|(_, score)| *score)
        .map(|(p, _)| p)
}

/// Look up a catalog entry by its stable id.
pub fn by_id(id: &str) -> Option<&'static Product> {
    CATALOG.iter().find(|p| p.id == id)
}

/// All catalog entries matching a category, for round-robin/weighted pick.
pub fn by_category(category: Category) -> impl Iterator<Item = &'static Product> {
    CATALOG.iter().filter(move |p| p.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_roughly_ten_products() {
        assert!(CATALOG.len() >= 8 && CATALOG.len() <= 12);
    }

    #[test]
    fn matches_product_by_keyword() {
        let p = match_product("Will Seattle rainfall exceed 10mm this week?").unwrap();
        assert_eq!(p.id, "seattle-rain-exceedance");
    }

    #[test]
    fn unmatched_text_returns_none() {
        assert!(match_product("completely unrelated text with no hits").is_none());
    }

    #[test]
    fn by_id_finds_known_product() {
        assert!(by_id("btc-weekly-drawdown").is_some());
        assert!(by_id("nonexistent").is_none());
    }
}
