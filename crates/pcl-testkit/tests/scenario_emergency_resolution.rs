//! Spec scenario 4: a fully funded `Active` pool whose deadline passed 24h
//! ago, with evidence unreachable so no regular resolution ever landed,
//! is emergency-resolved with `claim_approved = false`.

use pcl_schemas::{ContractVariant, Money, PoolRegistryEntry, PoolStatus, PublishedArtifacts};
use pcl_testkit::build;

#[tokio::test]
async fn unreachable_evidence_falls_through_to_emergency_resolve() {
    let harness = build(true); // would approve if consulted; it never gets the chance

    let deadline = 86_400;
    harness.controller.registry.write().await.insert(PoolRegistryEntry {
        schema_version: 1,
        pool_id: 0,
        contract_variant: ContractVariant::Current,
        product_id: "weather-rain".into(),
        description: "rain > 10mm in the next 24h".into(),
        evidence_source_url: "https://pcl-testkit-scenario.invalid/evidence".into(),
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
    let mut record = pcl_testkit::FakePoolRecord::new(Money::from_units(1_000), Money::from_units(50), deadline);
    record.status_code = 1; // Current::Active
    record.total_collateral = Money::from_units(1_000);
    harness.chain.insert_pool(ContractVariant::Current, 0, record);

    // One cycle at the deadline: evidence fetch fails (DNS failure against
    // the invalid host), so no regular resolution happens this cycle.
    let report_at_deadline = harness.controller.heartbeat(deadline + 1).await;
    assert_eq!(report_at_deadline.resolved, 0);
    assert_eq!(harness.chain.resolve_pool_call_count(), 0);
    assert_eq!(
        harness.controller.registry.read().await.get(ContractVariant::Current, 0).unwrap().status,
        PoolStatus::Active
    );

    // 24h + 1s later: emergency resolution kicks in regardless of the
    // still-unreachable evidence source.
    let report_emergency = harness.controller.heartbeat(deadline + 24 * 3_600 + 1).await;
    assert_eq!(report_emergency.emergency_resolved, 1);
    assert_eq!(harness.chain.emergency_call_count(), 1);
    assert_eq!(harness.chain.resolve_pool_call_count(), 0);

    let entry = harness.controller.registry.read().await.get(ContractVariant::Current, 0).unwrap().clone();
    assert_eq!(entry.status, PoolStatus::Resolved);
    assert_eq!(entry.claim_approved, Some(false));
}
