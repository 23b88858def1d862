//! pcl-oracle
//!
//! The dual-auditor evidence pipeline: fetch sanitized evidence for a due
//! pool, run two independent analyses over it, and combine them with the
//! conservative consensus rule from `pcl_schemas::DualAuthResult`. Any
//! fetch failure or auditor failure denies the claim — never approves on
//! partial information.
//!
//! `EvidenceAuditor` is grounded on `mqk-execution::order_router::BrokerAdapter`:
//! one trait shared by the real LLM-backed implementation ([`llm::LlmAuditor`])
//! and a deterministic test double ([`fake::FakeAuditor`]), so the
//! controller can be exercised without a live LLM endpoint.

pub mod attestation;
pub mod error;
pub mod fake;
pub mod llm;

use async_trait::async_trait;
use pcl_evidence::EvidenceFetcher;
use pcl_schemas::{AuditorVerdict, DualAuthResult, JudgeVerdict};

pub use attestation::AttestationRecorder;
pub use error::OracleError;
pub use fake::FakeAuditor;
pub use llm::LlmAuditor;

/// One analysis seam, invoked twice per resolution (once as Judge, once as
/// Auditor) with independent prompts. Both methods see only the sanitized
/// evidence and the pool description — never each other's output.
#[async_trait]
pub trait EvidenceAuditor: Send + Sync {
    async fn judge(&self, description: &str, evidence: &str) -> Result<JudgeVerdict, OracleError>;
    async fn audit(&self, description: &str, evidence: &str) -> Result<AuditorVerdict, OracleError>;
}

/// Run the full dual-auditor pipeline for one pool: fetch evidence, run
/// both analyses concurrently, combine by the conservative consensus rule.
/// A fetch failure short-circuits to [`DualAuthResult::fetch_failed`]
/// without invoking either auditor.
pub async fn resolve(
    fetcher: &EvidenceFetcher,
    auditor: &dyn EvidenceAuditor,
    evidence_source_url: &str,
    description: &str,
) -> DualAuthResult {
    let evidence = match fetcher.fetch(evidence_source_url).await {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(url = evidence_source_url, error = %err, "evidence fetch failed, denying claim");
            return DualAuthResult::fetch_failed();
        }
    };

    let (judge_result, auditor_result) =
        tokio::join!(auditor.judge(description, &evidence), auditor.audit(description, &evidence));

    let judge = match judge_result {
        Ok(v) => Some(v),
        Err(err) => {
            tracing::warn!(error = %err, "judge analysis failed, treating as denial");
            None
        }
    };
    let audit_verdict = match auditor_result {
        Ok(v) => Some(v),
        Err(err) => {
            tracing::warn!(error = %err, "auditor analysis failed, treating as denial");
            None
        }
    };

    DualAuthResult::from_verdicts(judge, audit_verdict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcl_evidence::EvidenceFetcher;
    use fake::FakeAuditor;

    #[tokio::test]
    async fn both_auditors_agree_true_approves() {
        let fetcher = EvidenceFetcher::new(false).unwrap();
        let auditor = FakeAuditor::always(true, true);
        // Fetch will fail against a non-existent host, exercising the
        // fail-closed path rather than a live network call.
        let result = resolve(&fetcher, &auditor, "https://pcl-oracle-test.invalid/evidence", "rain > 10mm").await;
        assert!(!result.claim_approved, "fetch failure must deny regardless of configured verdicts");
    }

    #[tokio::test]
    async fn disagreement_denies_via_fake_double() {
        let judge = JudgeVerdict { verdict: true, confidence: 0.9, rationale: "yes".into() };
        let audit = AuditorVerdict { verdict: false, rationale: "no".into() };
        let result = DualAuthResult::from_verdicts(Some(judge), Some(audit));
        assert!(!result.claim_approved);
    }

    #[tokio::test]
    async fn fake_auditor_returns_configured_verdicts_directly() {
        let auditor = FakeAuditor::always(true, true);
        let j = auditor.judge("d", "e").await.unwrap();
        let a = auditor.audit("d", "e").await.unwrap();
        assert!(j.verdict && a.verdict);
    }
}
