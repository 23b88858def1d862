//! Optional attestation recording for a resolution.
//!
//! When no hardware enclave is present (the common case), this module
//! still appends a `resolution_attested` event to the hash-chained audit
//! log and returns its `hash_self` as a stand-in "attestation hash" — it is
//! **not** a real hardware signature, only a tamper-evident record that the
//! resolution payload was produced at a specific chain position. Documented
//! as a stand-in in `DESIGN.md`, never presented as genuine attestation.

use pcl_audit::AuditWriter;
use pcl_schemas::{DualAuthResult, PoolId};
use uuid::Uuid;

/// Wraps an [`AuditWriter`] to record resolution outcomes and their
/// (stand-in, unless a real enclave is wired in later) attestation hash.
pub struct AttestationRecorder {
    writer: AuditWriter,
    run_id: Uuid,
}

impl AttestationRecorder {
    pub fn new(writer: AuditWriter, run_id: Uuid) -> Self {
        AttestationRecorder { writer, run_id }
    }

    /// Append a `resolution_attested` event and return its `hash_self`,
    /// which [`DualAuthResult::attestation_hash`] is then set to.
    pub fn record(&mut self, pool_id: PoolId, result: &DualAuthResult) -> Option<String> {
        let payload = serde_json::json!({
            "pool_id": pool_id,
            "claim_approved": result.claim_approved,
        });
        match self.writer.append(self.run_id, &format!("pool.{pool_id}"), "resolution_attested", payload) {
            Ok(ev) => ev.hash_self,
            Err(e) => {
                tracing::warn!(pool_id, error = %e, "failed to record resolution attestation");
                None
            }
        }
    }
}
