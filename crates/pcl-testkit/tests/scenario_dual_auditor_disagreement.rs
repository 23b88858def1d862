//! Spec scenario 5: Judge says `true` (confidence 0.9), Auditor says
//! `false`. The conservative consensus must deny the claim, and both
//! sub-verdicts must survive into the recorded `dual_auth_result`.

use httpmock::MockServer;
use pcl_oracle::FakeAuditor;
use pcl_schemas::{ContractVariant, Money, PoolRegistryEntry, PoolStatus, PublishedArtifacts};
use pcl_testkit::build_with_auditor;
use std::sync::Arc;

#[tokio::test]
async fn disagreement_denies_the_claim() {
    let server = MockServer::start();
    let evidence = server.mock(|when, then| {
        when.method(httpmock::Method::GET).path("/evidence");
        then.status(200).body("ambiguous reading, 9.8mm recorded");
    });

    let auditor = Arc::new(FakeAuditor::always(true, false).with_confidence(0.9));
    let harness = build_with_auditor(auditor);

    let deadline = 86_400;
    harness.controller.registry.write().await.insert(PoolRegistryEntry {
        schema_version: 1,
        pool_id: 0,
        contract_variant: ContractVariant::Current,
        product_id: "weather-rain".into(),
        description: "rain > 10mm in the next 24h".into(),
        evidence_source_url: server.url("/evidence"),
        coverage_amount: Money::from_units(1_000),
        premium_amount: Money::from_units(50),
        premium_rate_bps: 500,
        deadline,
        deposit_deadline: deadline - pcl_schemas::DEPOSIT_WINDOW_SECS,
        event_probability: 0.03,
        status: PoolStatus::Active,
        creation_tx_hash: Some("0xcreate".into()),
        resolution_tx_hash: None,
        published_artifacts: PublishedArtifacts::default(),
        claim_approved: None,
        dual_auth_result: None,
        commerce_sourced: false,
    });
    harness.chain.insert_pool(
        ContractVariant::Current,
        0,
        pcl_testkit::FakePoolRecord::new(Money::from_units(1_000), Money::from_units(50), deadline),
    );
    harness.chain.set_status(ContractVariant::Current, 0, 1); // Active

    let report = harness.controller.heartbeat(deadline + 1).await;
    evidence.assert();
    assert_eq!(report.resolved, 1);

    let entry = harness.controller.registry.read().await.get(ContractVariant::Current, 0).unwrap().clone();
    assert_eq!(entry.claim_approved, Some(false));
    let dual = entry.dual_auth_result.expect("dual auth result recorded");
    let judge = dual.judge.expect("judge verdict present");
    let auditor = dual.auditor.expect("auditor verdict present");
    assert!(judge.verdict);
    assert!((judge.confidence - 0.9).abs() < f64::EPSILON);
    assert!(!auditor.verdict);
    assert!(!dual.claim_approved);
}
