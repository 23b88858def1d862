//! pcl-schemas
//!
//! Shared wire/registry types consumed by every other `pcl-*` crate: the
//! pool registry entry and status predicates, the dual-auditor result, the
//! commerce-job schema, and the outbound social-artifact payload shape.
//! Centralizing these here (mirroring `mqk-schemas`) keeps every component
//! working off one definition instead of ad hoc duplicated structs.

mod artifact;
pub mod chain_abi;
mod commerce;
mod dual_auth;
mod money;
mod pool;

pub use artifact::{
    deep_link_url, ArtifactIntent, ArtifactRiskParams, CallStep, SocialArtifactPayload,
};
pub use commerce::{CommerceDeliverable, CommerceStatus, EvaluatorOutcome, ServiceRequest};
pub use dual_auth::{AuditorVerdict, DualAuthResult, JudgeVerdict};
pub use money::Money;
pub use pool::{
    is_legal_transition, ContractVariant, PoolId, PoolRegistryEntry, PoolStatus,
    PublishedArtifacts, DEPOSIT_WINDOW_SECS, EMERGENCY_RESOLVE_DELAY_SECS,
};
