//! Assembles a full [`Controller`] wired entirely to deterministic fakes,
//! grounded on `mqk-testkit::orchestrator`'s role of building a complete
//! `Orchestrator` out of paper/fake sub-engines for scenario tests.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use pcl_audit::AuditWriter;
use pcl_cache::{RateLimiter, ReadCache};
use pcl_controller::{Controller, ControllerConfig};
use pcl_evidence::EvidenceFetcher;
use pcl_oracle::{AttestationRecorder, FakeAuditor};
use pcl_registry::PoolRegistry;
use pcl_risk::engine::RiskEngine;
use pcl_risk::fetchers::{CryptoPriceFetcher, GasFeeFetcher, WeatherFetcher};
use pcl_schemas::ContractVariant;
use pcl_social::FakeSocialClient;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::fake_chain::FakeChain;

/// Everything a scenario test needs: the assembled controller plus handles
/// to every fake it is wired to, so the test can seed chain state, inspect
/// what was published, and assert on call counts.
pub struct TestHarness {
    pub controller: Controller,
    pub chain: Arc<FakeChain>,
    pub social: Arc<FakeSocialClient>,
}

/// Build a harness whose auditors always agree with `judge_and_auditor_verdict`.
/// Tests that need disagreement construct their own `FakeAuditor` and use
/// [`build_with_auditor`] instead.
pub fn build(judge_and_auditor_verdict: bool) -> TestHarness {
    build_with_auditor(Arc::new(FakeAuditor::always(
        judge_and_auditor_verdict,
        judge_and_auditor_verdict,
    )))
}

pub fn build_with_auditor(auditor: Arc<dyn pcl_oracle::EvidenceAuditor>) -> TestHarness {
    let chain = Arc::new(FakeChain::new());
    let social = Arc::new(FakeSocialClient::new("paracle_bot"));

    let audit_path = std::env::temp_dir().join(format!("pcl-testkit-audit-{}.jsonl", Uuid::new_v4()));
    let writer = AuditWriter::new(&audit_path, true).expect("audit writer");
    let attestation = AttestationRecorder::new(writer, Uuid::new_v4());

    let risk_engine = RiskEngine::new(vec![
        Arc::new(WeatherFetcher::default()),
        Arc::new(CryptoPriceFetcher::new(reqwest::Client::new(), None, "https://example.invalid")),
        Arc::new(GasFeeFetcher),
    ]);

    let controller = Controller {
        chain: chain.clone(),
        cache: Arc::new(ReadCache::with_default_ttl()),
        rate_limiter: Arc::new(RateLimiter::with_default_delay()),
        risk_engine: Arc::new(risk_engine),
        evidence_fetcher: Arc::new(EvidenceFetcher::new(false).expect("evidence fetcher")),
        auditor,
        social: social.clone(),
        registry: Arc::new(RwLock::new(PoolRegistry::new())),
        attestation: Arc::new(Mutex::new(attestation)),
        new_pool_variant: ContractVariant::Current,
        oracle_armed: Arc::new(AtomicBool::new(true)),
        not_suspended: Arc::new(AtomicBool::new(true)),
        chain_write_lock: Arc::new(Mutex::new(())),
        config: ControllerConfig::default(),
    };

    TestHarness { controller, chain, social }
}
