//! Exercises the bare router (no CORS/trace layers) against a controller
//! wired entirely to `pcl_testkit` fakes, the way `mqk-daemon`'s own route
//! tests compose its router directly via `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use bytes::Bytes;
use http_body_util::BodyExt;
use pcl_daemon::{bootstrap::StatePaths, routes, state::AppState};
use tower::ServiceExt;

fn test_paths() -> StatePaths {
    let dir = std::env::temp_dir().join(format!("pcl-daemon-test-{}", uuid::Uuid::new_v4()));
    StatePaths {
        registry_snapshot: dir.join("registry.json"),
        audit_log: dir.join("audit.jsonl"),
    }
}

async fn body_bytes(resp: axum::response::Response) -> Bytes {
    resp.into_body().collect().await.unwrap().to_bytes()
}

#[tokio::test]
async fn healthz_reports_ok() {
    let harness = pcl_testkit::build(false);
    let state = Arc::new(AppState::new(harness.controller, test_paths()));
    let app = routes::build_router(state);

    let resp = app
        .oneshot(axum::http::Request::builder().uri("/healthz").body(axum::body::Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), axum::http::StatusCode::OK);
    let body = body_bytes(resp).await;
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["ok"], true);
    assert_eq!(parsed["service"], "pcl-daemon");
}

#[tokio::test]
async fn status_reflects_empty_registry() {
    let harness = pcl_testkit::build(false);
    let state = Arc::new(AppState::new(harness.controller, test_paths()));
    let app = routes::build_router(state);

    let resp = app
        .oneshot(axum::http::Request::builder().uri("/v1/status").body(axum::body::Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), axum::http::StatusCode::OK);
    let body = body_bytes(resp).await;
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["live_pool_count"], 0);
    assert_eq!(parsed["oracle_armed"], true);
}
