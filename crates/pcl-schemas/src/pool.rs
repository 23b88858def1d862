//! Pool identity, status encoding, and the registry entry.
//!
//! The two deployed contract variants encode pool status with different
//! numeric codes. Business logic must never compare raw codes — it goes
//! through the predicates below, the same discipline `mqk-risk` applies to
//! `RiskAction`/`ReasonCode` (closed enums consumed by name, never by
//! discriminant).

use serde::{Deserialize, Serialize};

/// Opaque pool identifier assigned by the contract at creation.
pub type PoolId = u64;

/// Which of the two deployed contracts a pool lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContractVariant {
    Legacy,
    Current,
}

impl ContractVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            ContractVariant::Legacy => "legacy",
            ContractVariant::Current => "current",
        }
    }
}

/// Status of a pool, abstracted away from either contract's raw numeric
/// encoding. `Pending` only ever occurs on `Legacy` pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolStatus {
    Pending,
    Open,
    Active,
    Resolved,
    Cancelled,
}

impl PoolStatus {
    /// Decode a contract's raw numeric status code for the given variant.
    /// Returns `None` for a code the variant does not define (defensive
    /// against an ABI mismatch — callers should treat `None` as a hard error,
    /// never silently default).
    pub fn from_code(variant: ContractVariant, code: u8) -> Option<PoolStatus> {
        match (variant, code) {
            (ContractVariant::Legacy, 0) => Some(PoolStatus::Pending),
            (ContractVariant::Legacy, 1) => Some(PoolStatus::Open),
            (ContractVariant::Legacy, 2) => Some(PoolStatus::Active),
            (ContractVariant::Legacy, 3) => Some(PoolStatus::Resolved),
            (ContractVariant::Legacy, 4) => Some(PoolStatus::Cancelled),
            (ContractVariant::Current, 0) => Some(PoolStatus::Open),
            (ContractVariant::Current, 1) => Some(PoolStatus::Active),
            (ContractVariant::Current, 2) => Some(PoolStatus::Resolved),
            (ContractVariant::Current, 3) => Some(PoolStatus::Cancelled),
            _ => None,
        }
    }

    /// Encode back to the raw numeric code for the given variant. Panics if
    /// asked to encode `Pending` for `Current` (a programming error — the
    /// `Current` contract never produces that status); unrepresentable
    /// states fail loud rather than silently coercing to something wrong.
    pub fn to_code(self, variant: ContractVariant) -> u8 {
        match (variant, self) {
            (ContractVariant::Legacy, PoolStatus::Pending) => 0,
            (ContractVariant::Legacy, PoolStatus::Open) => 1,
            (ContractVariant::Legacy, PoolStatus::Active) => 2,
            (ContractVariant::Legacy, PoolStatus::Resolved) => 3,
            (ContractVariant::Legacy, PoolStatus::Cancelled) => 4,
            (ContractVariant::Current, PoolStatus::Open) => 0,
            (ContractVariant::Current, PoolStatus::Active) => 1,
            (ContractVariant::Current, PoolStatus::Resolved) => 2,
            (ContractVariant::Current, PoolStatus::Cancelled) => 3,
            (ContractVariant::Current, PoolStatus::Pending) => {
                panic!("Current variant has no Pending status")
            }
        }
    }

    pub fn is_live(self) -> bool {
        matches!(
            self,
            PoolStatus::Pending | PoolStatus::Open | PoolStatus::Active
        )
    }

    pub fn is_pending(self) -> bool {
        matches!(self, PoolStatus::Pending)
    }

    pub fn is_open(self) -> bool {
        matches!(self, PoolStatus::Open)
    }

    pub fn is_active(self) -> bool {
        matches!(self, PoolStatus::Active)
    }

    pub fn is_resolved(self) -> bool {
        matches!(self, PoolStatus::Resolved)
    }

    pub fn is_cancelled(self) -> bool {
        matches!(self, PoolStatus::Cancelled)
    }

    pub fn is_terminal(self) -> bool {
        self.is_resolved() || self.is_cancelled()
    }
}

/// `true` if `next` is a legal successor of `prev` in the pool lifecycle.
/// Used by the registry to refuse to regress or skip illegal edges when
/// applying a freshly observed on-chain status.
pub fn is_legal_transition(prev: PoolStatus, next: PoolStatus) -> bool {
    use PoolStatus::*;
    if prev == next {
        return true;
    }
    matches!(
        (prev, next),
        (Pending, Open)
            | (Pending, Cancelled)
            | (Open, Active)
            | (Open, Cancelled)
            | (Active, Resolved)
            | (Active, Cancelled)
    )
}

/// Published-artifact ids per lifecycle phase, one post id per phase at
/// most: 1 = creation, 2 = collateral-provided (Legacy Pending -> Open),
/// 3 = activation, 4 = resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishedArtifacts {
    pub phase1_creation: Option<String>,
    pub phase2_collateral: Option<String>,
    pub phase3_activation: Option<String>,
    pub phase4_resolution: Option<String>,
}

use crate::dual_auth::DualAuthResult;
use crate::money::Money;

/// A single insurance pool tracked by the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolRegistryEntry {
    pub schema_version: u32,
    pub pool_id: PoolId,
    pub contract_variant: ContractVariant,
    pub product_id: String,
    pub description: String,
    pub evidence_source_url: String,
    pub coverage_amount: Money,
    pub premium_amount: Money,
    pub premium_rate_bps: u32,
    pub deadline: i64,
    pub deposit_deadline: i64,
    pub event_probability: f64,
    pub status: PoolStatus,
    pub creation_tx_hash: Option<String>,
    pub resolution_tx_hash: Option<String>,
    pub published_artifacts: PublishedArtifacts,
    pub claim_approved: Option<bool>,
    pub dual_auth_result: Option<DualAuthResult>,
    pub commerce_sourced: bool,
}

/// Seconds between `deposit_deadline` and `deadline`.
pub const DEPOSIT_WINDOW_SECS: i64 = 7_200;
/// Seconds past `deadline` after which emergency resolution is permitted.
pub const EMERGENCY_RESOLVE_DELAY_SECS: i64 = 24 * 3_600;

impl PoolRegistryEntry {
    /// `true` once `deadline` has passed (eligible for regular resolution).
    pub fn is_due_for_resolution(&self, now: i64) -> bool {
        self.status.is_active() && self.deadline <= now
    }

    /// `true` once the emergency window has strictly elapsed and no regular
    /// resolution has happened yet.
    pub fn is_due_for_emergency_resolution(&self, now: i64) -> bool {
        self.status.is_active() && self.deadline + EMERGENCY_RESOLVE_DELAY_SECS < now
    }

    /// `true` once new collateral can no longer be deposited.
    pub fn deposit_window_closed(&self, now: i64) -> bool {
        self.deposit_deadline <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_predicates_follow_table() {
        assert_eq!(
            PoolStatus::from_code(ContractVariant::Legacy, 0),
            Some(PoolStatus::Pending)
        );
        assert_eq!(
            PoolStatus::from_code(ContractVariant::Legacy, 3),
            Some(PoolStatus::Resolved)
        );
        assert!(PoolStatus::from_code(ContractVariant::Legacy, 1)
            .unwrap()
            .is_live());
    }

    #[test]
    fn current_predicates_follow_table() {
        assert_eq!(
            PoolStatus::from_code(ContractVariant::Current, 0),
            Some(PoolStatus::Open)
        );
        assert_eq!(
            PoolStatus::from_code(ContractVariant::Current, 3),
            Some(PoolStatus::Cancelled)
        );
        assert!(PoolStatus::from_code(ContractVariant::Current, 4).is_none());
    }

    #[test]
    fn transitions_are_monotonic() {
        assert!(is_legal_transition(PoolStatus::Pending, PoolStatus::Open));
        assert!(is_legal_transition(PoolStatus::Active, PoolStatus::Resolved));
        assert!(!is_legal_transition(PoolStatus::Resolved, PoolStatus::Active));
        assert!(!is_legal_transition(PoolStatus::Open, PoolStatus::Pending));
    }

    #[test]
    fn emergency_boundary_is_strict() {
        let mut e = sample_entry();
        e.status = PoolStatus::Active;
        e.deadline = 1_000;
        assert!(!e.is_due_for_emergency_resolution(1_000 + EMERGENCY_RESOLVE_DELAY_SECS));
        assert!(e.is_due_for_emergency_resolution(1_000 + EMERGENCY_RESOLVE_DELAY_SECS + 1));
    }

    fn sample_entry() -> PoolRegistryEntry {
        PoolRegistryEntry {
            schema_version: 1,
            pool_id: 1,
            contract_variant: ContractVariant::Current,
            product_id: "weather-rain".into(),
            description: "test".into(),
            evidence_source_url: "https://example.com".into(),
            coverage_amount: Money::from_units(1000),
            premium_amount: Money::from_units(50),
            premium_rate_bps: 500,
            deadline: 1_000,
            deposit_deadline: 1_000 - DEPOSIT_WINDOW_SECS,
            event_probability: 0.1,
            status: PoolStatus::Open,
            creation_tx_hash: None,
            resolution_tx_hash: None,
            published_artifacts: PublishedArtifacts::default(),
            claim_approved: None,
            dual_auth_result: None,
            commerce_sourced: false,
        }
    }
}
