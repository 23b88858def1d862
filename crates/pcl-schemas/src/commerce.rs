//! Commerce-job wire schema.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::pool::PoolId;

/// A service request accepted by the commerce job handler, in its already
/// structured form. Free-text requests are parsed into this shape by
/// `pcl-commerce::parse` before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub coverage_amount: Money,
    pub duration_days: u32,
    pub protocol: Option<String>,
    pub coverage_type: String,
    pub raw_text: Option<String>,
}

/// Outcome status of a commerce job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommerceStatus {
    CoverageCreated,
    CoverageRejected,
    Error,
}

/// Structured deliverable returned to the commerce protocol for one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommerceDeliverable {
    pub status: CommerceStatus,
    pub pool_id: Option<PoolId>,
    pub transaction_hash: Option<String>,
    pub coverage_amount: Option<Money>,
    pub premium_amount: Option<Money>,
    pub evidence_source_url: Option<String>,
    pub resolution_mechanism: String,
    pub reason: Option<String>,
}

impl CommerceDeliverable {
    pub fn rejected(reason: impl Into<String>) -> Self {
        CommerceDeliverable {
            status: CommerceStatus::CoverageRejected,
            pool_id: None,
            transaction_hash: None,
            coverage_amount: None,
            premium_amount: None,
            evidence_source_url: None,
            resolution_mechanism: "dual_auditor_oracle".to_string(),
            reason: Some(reason.into()),
        }
    }

    pub fn errored(reason: impl Into<String>) -> Self {
        CommerceDeliverable {
            status: CommerceStatus::Error,
            pool_id: None,
            transaction_hash: None,
            coverage_amount: None,
            premium_amount: None,
            evidence_source_url: None,
            resolution_mechanism: "dual_auditor_oracle".to_string(),
            reason: Some(reason.into()),
        }
    }
}

/// Evaluator-callback output: a single approve/reason pair used by the
/// commerce protocol to show its own caller why a quote was or wasn't
/// approved, independent of the full `CommerceDeliverable`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorOutcome {
    pub approved: bool,
    pub rationale: String,
}
