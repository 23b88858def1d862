//! pcl-daemon entry point.
//!
//! Thin by design: load config, assemble the agent, spawn the heartbeat
//! loop, serve the read-only HTTP surface. All route handlers live in
//! `routes.rs`; all shared state lives in `state.rs`.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use pcl_daemon::{bootstrap, routes, state};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let bootstrapped = bootstrap::bootstrap().await.context("bootstrap agent")?;
    info!(config_hash = %bootstrapped.config.config_hash(), "pcl-daemon starting");

    let interval = std::time::Duration::from_secs(bootstrapped.config.role.heartbeat_interval_secs());
    let shared = Arc::new(state::AppState::new(bootstrapped.controller, bootstrapped.paths));
    state::spawn_heartbeat_loop(Arc::clone(&shared), interval);

    let app = routes::build_router(Arc::clone(&shared))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_localhost_only());

    let addr = bind_addr_from_env().unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8900)));
    info!("pcl-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .await
        .context("server crashed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}

fn bind_addr_from_env() -> Option<SocketAddr> {
    std::env::var("PCL_DAEMON_ADDR").ok()?.parse().ok()
}

/// CORS: allow only localhost origins, matching the teacher's policy for
/// its own observability-surface daemon.
fn cors_localhost_only() -> CorsLayer {
    let allowed_origins = [
        "http://localhost",
        "http://127.0.0.1",
        "http://localhost:3000",
        "http://127.0.0.1:3000",
    ];
    let origins: Vec<HeaderValue> = allowed_origins.iter().filter_map(|o| HeaderValue::from_str(o).ok()).collect();
    CorsLayer::new().allow_origin(origins).allow_methods([Method::GET]).allow_headers(tower_http::cors::Any)
}
