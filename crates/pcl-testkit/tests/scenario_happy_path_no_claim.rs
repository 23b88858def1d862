//! Spec scenario 1: create on `Current`, a provider funds it in full, and
//! at `deadline + 1s` both auditors deny the claim so `resolve_pool(false)`
//! is the only chain write the heartbeat performs.

use httpmock::MockServer;
use pcl_schemas::{ContractVariant, Money, PoolRegistryEntry, PoolStatus, PublishedArtifacts};
use pcl_testkit::build;

#[tokio::test]
async fn provider_funds_then_resolves_false_on_deny() {
    let server = MockServer::start();
    let evidence = server.mock(|when, then| {
        when.method(httpmock::Method::GET).path("/evidence");
        then.status(200).body("no rainfall recorded in the last 24h");
    });

    let harness = build(false);

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
        status: PoolStatus::Open,
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

    // Provider joins in full at T+1s: chain reports `Active`.
    harness.chain.set_status(ContractVariant::Current, 0, 1);
    harness.chain.set_total_collateral(ContractVariant::Current, 0, Money::from_units(1_000));
    harness.controller.heartbeat(1).await;
    assert_eq!(
        harness.controller.registry.read().await.get(ContractVariant::Current, 0).unwrap().status,
        PoolStatus::Active
    );

    let report = harness.controller.heartbeat(deadline + 1).await;
    evidence.assert();
    assert_eq!(report.resolved, 1);
    assert_eq!(harness.chain.resolve_pool_call_count(), 1);

    let entry = harness.controller.registry.read().await.get(ContractVariant::Current, 0).unwrap().clone();
    assert_eq!(entry.status, PoolStatus::Resolved);
    assert_eq!(entry.claim_approved, Some(false));
    let record = harness.chain.get_record(ContractVariant::Current, 0).unwrap();
    assert!(!record.claim_approved);

    // A second heartbeat at the same instant must not resolve it again —
    // the pool already left `Active`, so it is no longer due.
    harness.controller.heartbeat(deadline + 2).await;
    assert_eq!(harness.chain.resolve_pool_call_count(), 1);
}
