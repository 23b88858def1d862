//! Parse an inbound commerce job, either a structured JSON payload or
//! free-text (spec §4.6 step 1), via keyword dictionaries for amount,
//! duration, protocol, and coverage type.

use pcl_schemas::{Money, ServiceRequest};

const DEFAULT_DURATION_DAYS: u32 = 30;

const KNOWN_PROTOCOLS: &[&str] = &[
    "uniswap", "aave", "compound", "curve", "lido", "makerdao", "maker", "balancer", "gmx",
];

const COVERAGE_TYPE_KEYWORDS: &[(&str, &str)] = &[
    ("rain", "weather"),
    ("rainfall", "weather"),
    ("hurricane", "weather"),
    ("storm", "weather"),
    ("btc", "crypto-price"),
    ("bitcoin", "crypto-price"),
    ("eth", "crypto-price"),
    ("ethereum", "crypto-price"),
    ("price", "crypto-price"),
    ("gas", "gas-fee"),
    ("gwei", "gas-fee"),
    ("tvl", "defi-protocol"),
    ("depeg", "defi-protocol"),
    ("liquidity", "defi-protocol"),
    ("validator", "on-chain-event"),
    ("uptime", "on-chain-event"),
    ("governance", "on-chain-event"),
    ("vote", "on-chain-event"),
];

/// Parse a JSON payload into a [`ServiceRequest`] directly.
pub fn parse_json(raw: &str) -> Result<ServiceRequest, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON service request: {e}"))
}

/// Best-effort free-text parse. Always returns a request (possibly with
/// defaulted or empty fields) — validation rejects what this can't fill in,
/// rather than this function failing outright.
pub fn parse_free_text(raw: &str) -> ServiceRequest {
    let lower = raw.to_lowercase();

    ServiceRequest {
        coverage_amount: extract_amount(&lower).unwrap_or(Money::ZERO),
        duration_days: extract_duration_days(&lower).unwrap_or(DEFAULT_DURATION_DAYS),
        protocol: extract_protocol(&lower),
        coverage_type: extract_coverage_type(&lower).unwrap_or_else(|| "general".to_string()),
        raw_text: Some(raw.to_string()),
    }
}

/// Scan for a digit run (allowing `,` thousands separators) followed by an
/// amount-denoting token (`$`, `usdc`, `usdt`, `dai`, `usd`, `coverage`).
fn extract_amount(lower: &str) -> Option<Money> {
    let chars: Vec<char> = lower.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let leading_dollar = chars[i] == '$';
        let digit_start = if leading_dollar { i + 1 } else { i };
        if digit_start < chars.len() && chars[digit_start].is_ascii_digit() {
            let start = digit_start;
            let mut j = digit_start;
            while j < chars.len() && (chars[j].is_ascii_digit() || chars[j] == ',' || chars[j] == '.') {
                j += 1;
            }
            let number_str: String = chars[start..j].iter().filter(|c| **c != ',').collect();
            if let Ok(value) = number_str.parse::<f64>() {
                let rest_trimmed: String = chars[j..].iter().collect::<String>();
                let rest_trimmed = rest_trimmed.trim_start();
                let has_currency_suffix =
                    ["usdc", "usdt", "dai", "usd", "units", "coverage"].iter().any(|u| rest_trimmed.starts_with(u));
                if leading_dollar || has_currency_suffix {
                    return Some(Money::from_units_f64(value));
                }
            }
            i = j;
        } else {
            i += 1;
        }
    }
    None
}

/// Scan for `<n> day(s)` / `<n> week(s)` / `<n> month(s)`, converting to days.
fn extract_duration_days(lower: &str) -> Option<u32> {
    let chars: Vec<char> = lower.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let number_str: String = chars[start..i].iter().collect();
            let rest_trimmed: String = chars[i..].iter().collect::<String>();
            let rest_trimmed = rest_trimmed.trim_start();
            if let Ok(n) = number_str.parse::<u32>() {
                if rest_trimmed.starts_with("day") {
                    return Some(n);
                }
                if rest_trimmed.starts_with("week") {
                    return Some(n.saturating_mul(7));
                }
                if rest_trimmed.starts_with("month") {
                    return Some(n.saturating_mul(30));
                }
            }
        } else {
            i += 1;
        }
    }
    None
}

fn extract_protocol(lower: &str) -> Option<String> {
    KNOWN_PROTOCOLS.iter().find(|p| lower.contains(**p)).map(|p| p.to_string())
}

fn extract_coverage_type(lower: &str) -> Option<String> {
    COVERAGE_TYPE_KEYWORDS
        .iter()
        .find(|(kw, _)| lower.contains(*kw))
        .map(|(_, category)| category.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_dollar_amount() {
        assert_eq!(extract_amount("i need $1500 of coverage"), Some(Money::from_units(1500)));
    }

    #[test]
    fn extracts_amount_with_currency_suffix() {
        assert_eq!(extract_amount("cover 2000 usdc for my position"), Some(Money::from_units(2000)));
    }

    #[test]
    fn extracts_comma_separated_amount() {
        assert_eq!(extract_amount("need $10,000 usdc coverage"), Some(Money::from_units(10_000)));
    }

    #[test]
    fn no_amount_found_returns_none() {
        assert_eq!(extract_amount("no numbers or currency here"), None);
    }

    #[test]
    fn extracts_week_duration_in_days() {
        assert_eq!(extract_duration_days("for 2 weeks please"), Some(14));
    }

    #[test]
    fn extracts_day_duration() {
        assert_eq!(extract_duration_days("protect me for 10 days"), Some(10));
    }

    #[test]
    fn detects_known_protocol() {
        assert_eq!(extract_protocol("insurance for my aave position"), Some("aave".to_string()));
    }

    #[test]
    fn detects_coverage_type_by_keyword() {
        assert_eq!(extract_coverage_type("will eth rally this week"), Some("crypto-price".to_string()));
    }

    #[test]
    fn free_text_parse_falls_back_to_defaults() {
        let req = parse_free_text("give me insurance");
        assert_eq!(req.duration_days, DEFAULT_DURATION_DAYS);
        assert_eq!(req.coverage_type, "general");
        assert_eq!(req.coverage_amount, Money::ZERO);
    }

    #[test]
    fn json_parse_round_trips() {
        let json = r#"{"coverage_amount": 1000000000, "duration_days": 14, "protocol": null, "coverage_type": "weather", "raw_text": null}"#;
        let req = parse_json(json).unwrap();
        assert_eq!(req.duration_days, 14);
        assert_eq!(req.coverage_type, "weather");
    }
}
