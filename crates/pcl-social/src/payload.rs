//! Outbound artifact payload builder (spec §4.7/§6), grounded on
//! `mqk-artifacts`'s manifest-building style: plain structs assembled by a
//! free function and serialized with `serde_json::to_string_pretty` for a
//! deterministic field order, rather than any templating engine.
//!
//! This module only assembles the JSON/text shapes; the machine-execution
//! call objects' `data`/`value` fields are pre-encoded by the caller (the
//! Chain Client owns ABI encoding, per spec §4.1) and simply carried here.

use pcl_schemas::{deep_link_url, ArtifactIntent, ArtifactRiskParams, CallStep, Money, PoolId, SocialArtifactPayload};

pub const PROTOCOL_ID: &str = "paracle-insurance";
pub const PROTOCOL_VERSION: &str = "1";

pub struct BuildPayloadArgs<'a> {
    pub chain_id: u64,
    pub intent: ArtifactIntent,
    pub pool_id: PoolId,
    pub coverage_amount: Money,
    pub premium_amount: Money,
    pub deadline: i64,
    pub contract_addresses: Vec<String>,
    pub frequency: f64,
    pub ev_per_100_units: f64,
    pub machine_execution_payload: Vec<CallStep>,
    pub deep_link_base_url: &'a str,
}

/// Assemble the JSON block embedded in every published artifact.
pub fn build_payload(args: BuildPayloadArgs<'_>) -> SocialArtifactPayload {
    let human_deep_link_url = deep_link_url(
        args.deep_link_base_url,
        args.intent,
        deep_link_amount(args.intent, args.coverage_amount, args.premium_amount),
    );

    SocialArtifactPayload {
        protocol_id: PROTOCOL_ID.to_string(),
        protocol_version: PROTOCOL_VERSION.to_string(),
        chain_id: args.chain_id,
        intent: args.intent,
        pool_id: args.pool_id,
        coverage_amount: args.coverage_amount,
        premium_amount: args.premium_amount,
        deadline: args.deadline,
        contract_addresses: args.contract_addresses,
        risk_params: ArtifactRiskParams {
            frequency: args.frequency,
            ev_per_100_units: args.ev_per_100_units,
        },
        machine_execution_payload: args.machine_execution_payload,
        human_deep_link_url,
    }
}

fn deep_link_amount(intent: ArtifactIntent, coverage: Money, premium: Money) -> Option<Money> {
    match intent {
        ArtifactIntent::FundPremium => Some(premium),
        ArtifactIntent::ProvideLiquidity => Some(coverage),
        ArtifactIntent::Withdraw => None,
    }
}

/// Short-post teaser body (caller must still enforce the 500-char cap before
/// publishing; this builder does not truncate silently).
pub fn build_short_post_body(payload: &SocialArtifactPayload, summary: &str) -> String {
    format!(
        "{summary}\n\npool #{} · coverage {} · deadline {}\nfull payload + deep link in the linked article.",
        payload.pool_id, payload.coverage_amount, payload.deadline
    )
}

/// Long-article body: a human-readable summary followed by the full payload
/// JSON in a fenced block, per spec §6 ("the article accompanying each short
/// post repeats the full payload JSON inside a fenced block").
pub fn build_long_article_body(payload: &SocialArtifactPayload, summary: &str) -> serde_json::Result<String> {
    let json = payload.to_pretty_json()?;
    Ok(format!(
        "{summary}\n\ndeep link: {}\n\n```json\n{json}\n```\n",
        payload.human_deep_link_url
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcl_schemas::Money;

    fn sample_call_step() -> CallStep {
        CallStep {
            step: 1,
            action: "approve".to_string(),
            to: "0xStablecoin".to_string(),
            data: "0xdeadbeef".to_string(),
            value: "0".to_string(),
            description: "approve stablecoin spend".to_string(),
            decoded: serde_json::json!({"spender": "0xPool", "amount": "50000000"}),
        }
    }

    #[test]
    fn fund_premium_deep_link_carries_premium_amount() {
        let payload = build_payload(BuildPayloadArgs {
            chain_id: 1,
            intent: ArtifactIntent::FundPremium,
            pool_id: 7,
            coverage_amount: Money::from_units(1000),
            premium_amount: Money::from_units(50),
            deadline: 1_900_000_000,
            contract_addresses: vec!["0xPool".to_string()],
            frequency: 0.08,
            ev_per_100_units: 12.0,
            machine_execution_payload: vec![sample_call_step()],
            deep_link_base_url: "https://paracle.example/p/7",
        });
        assert!(payload.human_deep_link_url.contains("action=fund_premium"));
        assert!(payload.human_deep_link_url.contains("amount=50"));
    }

    #[test]
    fn withdraw_deep_link_has_no_amount() {
        let payload = build_payload(BuildPayloadArgs {
            chain_id: 1,
            intent: ArtifactIntent::Withdraw,
            pool_id: 7,
            coverage_amount: Money::from_units(1000),
            premium_amount: Money::from_units(50),
            deadline: 1_900_000_000,
            contract_addresses: vec!["0xPool".to_string()],
            frequency: 0.08,
            ev_per_100_units: 12.0,
            machine_execution_payload: vec![],
            deep_link_base_url: "https://paracle.example/p/7",
        });
        assert_eq!(payload.human_deep_link_url, "https://paracle.example/p/7?action=withdraw");
    }

    #[test]
    fn long_article_embeds_fenced_json_block() {
        let payload = build_payload(BuildPayloadArgs {
            chain_id: 1,
            intent: ArtifactIntent::ProvideLiquidity,
            pool_id: 7,
            coverage_amount: Money::from_units(1000),
            premium_amount: Money::from_units(50),
            deadline: 1_900_000_000,
            contract_addresses: vec!["0xPool".to_string()],
            frequency: 0.08,
            ev_per_100_units: 12.0,
            machine_execution_payload: vec![sample_call_step()],
            deep_link_base_url: "https://paracle.example/p/7",
        });
        let article = build_long_article_body(&payload, "new pool open for collateral").unwrap();
        assert!(article.contains("```json"));
        assert!(article.contains("\"pool_id\": 7"));
    }
}
