//! Testable property (spec §8): two successive heartbeats with no on-chain
//! change between them produce no on-chain writes in the second.

use pcl_schemas::{ContractVariant, Money, PoolRegistryEntry, PoolStatus, PublishedArtifacts};
use pcl_testkit::{build, FakePoolRecord};

#[tokio::test]
async fn second_heartbeat_with_no_chain_change_writes_nothing() {
    let mut harness = build(false);
    harness.controller.config.pause_pool_creation = true;

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
        FakePoolRecord::new(Money::from_units(1_000), Money::from_units(50), deadline),
    );

    let writes = |h: &pcl_testkit::TestHarness| {
        h.chain.create_pool_call_count()
            + h.chain.resolve_pool_call_count()
            + h.chain.cancel_call_count()
            + h.chain.emergency_call_count()
    };

    harness.controller.heartbeat(0).await;
    let after_first = writes(&harness);

    harness.controller.heartbeat(1).await;
    let after_second = writes(&harness);

    assert_eq!(after_first, 0);
    assert_eq!(after_second, after_first);
    assert_eq!(
        harness.controller.registry.read().await.get(ContractVariant::Current, 0).unwrap().status,
        PoolStatus::Open
    );
}
