//! Dual-auditor resolution result, recorded on the registry entry once a
//! pool resolves.

use serde::{Deserialize, Serialize};

/// Independent verdict from one evidence analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditorVerdict {
    pub verdict: bool,
    pub rationale: String,
}

/// The Judge's verdict additionally carries a confidence score. Confidence is
/// recorded for audit purposes but must never influence the consensus rule —
/// it is never read by `from_verdicts` below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeVerdict {
    pub verdict: bool,
    pub confidence: f64,
    pub rationale: String,
}

/// Combined result of the dual-auditor oracle pipeline, attached to the
/// registry entry once a pool resolves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DualAuthResult {
    pub judge: Option<JudgeVerdict>,
    pub auditor: Option<AuditorVerdict>,
    pub claim_approved: bool,
    pub attestation_hash: Option<String>,
}

impl DualAuthResult {
    /// Conservative consensus: both verdicts `true`, and both sub-results
    /// present, or the result is `false`. Any missing sub-result (fetch or
    /// auditor failure) is treated as a `false` verdict for that auditor.
    pub fn from_verdicts(judge: Option<JudgeVerdict>, auditor: Option<AuditorVerdict>) -> Self {
        let judge_ok = judge.as_ref().map(|j| j.verdict).unwrap_or(false);
        let auditor_ok = auditor.as_ref().map(|a| a.verdict).unwrap_or(false);
        DualAuthResult {
            judge,
            auditor,
            claim_approved: judge_ok && auditor_ok,
            attestation_hash: None,
        }
    }

    /// A result representing an evidence-fetch failure: neither auditor ran,
    /// claim is denied by the conservative default.
    pub fn fetch_failed() -> Self {
        DualAuthResult {
            judge: None,
            auditor: None,
            claim_approved: false,
            attestation_hash: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_true_approves() {
        let r = DualAuthResult::from_verdicts(
            Some(JudgeVerdict {
                verdict: true,
                confidence: 0.9,
                rationale: "yes".into(),
            }),
            Some(AuditorVerdict {
                verdict: true,
                rationale: "yes".into(),
            }),
        );
        assert!(r.claim_approved);
    }

    #[test]
    fn disagreement_denies() {
        let r = DualAuthResult::from_verdicts(
            Some(JudgeVerdict {
                verdict: true,
                confidence: 0.9,
                rationale: "yes".into(),
            }),
            Some(AuditorVerdict {
                verdict: false,
                rationale: "no".into(),
            }),
        );
        assert!(!r.claim_approved);
    }

    #[test]
    fn high_confidence_does_not_override_disagreement() {
        let r = DualAuthResult::from_verdicts(
            Some(JudgeVerdict {
                verdict: true,
                confidence: 1.0,
                rationale: "very sure".into(),
            }),
            Some(AuditorVerdict {
                verdict: false,
                rationale: "no".into(),
            }),
        );
        assert!(!r.claim_approved);
    }

    #[test]
    fn missing_auditor_denies() {
        let r = DualAuthResult::from_verdicts(
            Some(JudgeVerdict {
                verdict: true,
                confidence: 0.9,
                rationale: "yes".into(),
            }),
            None,
        );
        assert!(!r.claim_approved);
    }
}
