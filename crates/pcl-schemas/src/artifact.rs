//! Outbound social-artifact payload shape.
//!
//! Field layout and the "deterministic field order via plain struct +
//! `serde_json`" approach are grounded on `mqk-artifacts::RunManifest`.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::pool::PoolId;

/// Intent encoded in the machine-execution payload and the deep-link URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactIntent {
    FundPremium,
    ProvideLiquidity,
    Withdraw,
}

/// One wallet-ready call object in the ordered machine-execution payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallStep {
    pub step: u32,
    pub action: String,
    pub to: String,
    pub data: String,
    pub value: String,
    pub description: String,
    pub decoded: serde_json::Value,
}

/// Risk parameters surfaced alongside the raw pool parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRiskParams {
    pub frequency: f64,
    pub ev_per_100_units: f64,
}

/// The JSON block embedded in every published artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialArtifactPayload {
    pub protocol_id: String,
    pub protocol_version: String,
    pub chain_id: u64,
    pub intent: ArtifactIntent,
    pub pool_id: PoolId,
    pub coverage_amount: Money,
    pub premium_amount: Money,
    pub deadline: i64,
    pub contract_addresses: Vec<String>,
    pub risk_params: ArtifactRiskParams,
    pub machine_execution_payload: Vec<CallStep>,
    pub human_deep_link_url: String,
}

impl SocialArtifactPayload {
    /// Render as a pretty JSON string suitable for embedding in a fenced
    /// code block inside a long-form article.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Build the human deep-link URL with the `action`/`amount` query params.
pub fn deep_link_url(base_url: &str, intent: ArtifactIntent, amount: Option<Money>) -> String {
    let action = match intent {
        ArtifactIntent::FundPremium => "fund_premium",
        ArtifactIntent::ProvideLiquidity => "provide_collateral",
        ArtifactIntent::Withdraw => "withdraw",
    };
    match amount {
        Some(a) => format!("{base_url}?action={action}&amount={}", a.as_units_f64()),
        None => format!("{base_url}?action={action}"),
    }
}
