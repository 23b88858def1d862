//! Deterministic [`crate::EvidenceAuditor`] double for controller and
//! testkit scenarios, grounded on `mqk-testkit::paper_broker::PaperBroker`'s
//! pattern: no network, no RNG, configured outcomes returned immediately.

use async_trait::async_trait;

use pcl_schemas::{AuditorVerdict, JudgeVerdict};

use crate::error::OracleError;
use crate::EvidenceAuditor;

/// Always returns the same configured verdicts, or a configured error if
/// `fail` is set — useful for exercising the "one auditor errors" path.
pub struct FakeAuditor {
    judge_verdict: bool,
    auditor_verdict: bool,
    confidence: f64,
    fail_judge: bool,
    fail_audit: bool,
}

impl FakeAuditor {
    pub fn always(judge_verdict: bool, auditor_verdict: bool) -> Self {
        FakeAuditor {
            judge_verdict,
            auditor_verdict,
            confidence: 0.9,
            fail_judge: false,
            fail_audit: false,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn failing_judge() -> Self {
        FakeAuditor {
            judge_verdict: false,
            auditor_verdict: false,
            confidence: 0.0,
            fail_judge: true,
            fail_audit: false,
        }
    }

    pub fn failing_audit() -> Self {
        FakeAuditor {
            judge_verdict: false,
            auditor_verdict: false,
            confidence: 0.0,
            fail_judge: false,
            fail_audit: true,
        }
    }
}

#[async_trait]
impl EvidenceAuditor for FakeAuditor {
    async fn judge(&self, _description: &str, _evidence: &str) -> Result<JudgeVerdict, OracleError> {
        if self.fail_judge {
            return Err(OracleError::Transport("fake judge failure".to_string()));
        }
        Ok(JudgeVerdict {
            verdict: self.judge_verdict,
            confidence: self.confidence,
            rationale: "fake judge verdict".to_string(),
        })
    }

    async fn audit(&self, _description: &str, _evidence: &str) -> Result<AuditorVerdict, OracleError> {
        if self.fail_audit {
            return Err(OracleError::Transport("fake auditor failure".to_string()));
        }
        Ok(AuditorVerdict {
            verdict: self.auditor_verdict,
            rationale: "fake auditor verdict".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failing_judge_surfaces_as_error() {
        let auditor = FakeAuditor::failing_judge();
        assert!(auditor.judge("d", "e").await.is_err());
        assert!(auditor.audit("d", "e").await.is_ok());
    }
}
