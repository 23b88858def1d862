//! Error taxonomy for one heartbeat cycle (spec §7). Mirrors `mqk_risk`'s
//! `ReasonCode`: a closed enum consumed by name, with `is_alarm` deciding
//! whether the heartbeat's top-level catch logs at `error!` or `warn!`.

use std::fmt;

use pcl_schemas::PoolId;

#[derive(Debug)]
pub enum ControllerError {
    /// Retries exhausted within this heartbeat; skipped, retried next cycle.
    TransientIo { context: String, detail: String },
    /// A contract call reverted. Logged with the pool id; does not abort
    /// the cycle.
    ContractRevert { pool_id: PoolId, reason: String },
    /// `resolve_pool` reverted after its deadline had already passed — a
    /// hard alarm; the controller falls back to emergency-resolve once the
    /// 24h window elapses.
    ResolveRevertAfterDeadline { pool_id: PoolId, reason: String },
    /// The configured wallet is not the contract's recognized oracle,
    /// detected at startup. The controller continues in degraded
    /// (read-only for oracle ops) mode.
    OracleNotAuthorized { configured: String, expected: String },
    /// Commerce-job or risk-engine validation failure; surfaced to the
    /// caller as a rejection deliverable, not an alarm.
    ParseValidation { reason: String },
    /// Platform suspension/rate-limit parsed from error text.
    SocialSuspended { until_unix: i64 },
    /// Evidence fetch failed for a due pool; retried next cycle.
    EvidenceFetchFailed { pool_id: PoolId },
    /// An LLM call (judge or auditor) failed; treated like an evidence
    /// fetch failure, the pool is not resolved this cycle.
    LlmFailure { pool_id: PoolId },
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::TransientIo { context, detail } => {
                write!(f, "transient I/O error during {context}: {detail}")
            }
            ControllerError::ContractRevert { pool_id, reason } => {
                write!(f, "pool {pool_id}: contract call reverted: {reason}")
            }
            ControllerError::ResolveRevertAfterDeadline { pool_id, reason } => {
                write!(f, "pool {pool_id}: resolve_pool reverted after deadline: {reason}")
            }
            ControllerError::OracleNotAuthorized { configured, expected } => {
                write!(f, "configured wallet {configured} is not the contract oracle {expected}")
            }
            ControllerError::ParseValidation { reason } => write!(f, "validation rejected: {reason}"),
            ControllerError::SocialSuspended { until_unix } => {
                write!(f, "social platform suspended until unix {until_unix}")
            }
            ControllerError::EvidenceFetchFailed { pool_id } => {
                write!(f, "pool {pool_id}: evidence fetch failed, will retry next cycle")
            }
            ControllerError::LlmFailure { pool_id } => {
                write!(f, "pool {pool_id}: llm call failed, will retry next cycle")
            }
        }
    }
}

impl std::error::Error for ControllerError {}

impl ControllerError {
    /// `true` if this error kind warrants an `error!`-level alarm rather
    /// than an expected `warn!`.
    pub fn is_alarm(&self) -> bool {
        matches!(
            self,
            ControllerError::ResolveRevertAfterDeadline { .. } | ControllerError::OracleNotAuthorized { .. }
        )
    }
}
