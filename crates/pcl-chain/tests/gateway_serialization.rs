use pcl_chain::TxGateway;

#[tokio::test]
async fn gate_refusal_never_touches_the_write_lock() {
    let gateway = TxGateway::new();
    // If the gate refused before taking the lock, a subsequent call that
    // should succeed proves the lock was never poisoned or left held.
    let refused = gateway
        .run(false, true, || async { Ok::<_, pcl_chain::ChainError>(()) })
        .await;
    assert!(refused.is_err());

    let ok = gateway
        .run(true, true, || async { Ok::<_, pcl_chain::ChainError>(42) })
        .await;
    assert_eq!(ok.unwrap(), 42);
}
