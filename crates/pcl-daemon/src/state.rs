//! Shared runtime state for pcl-daemon, grounded on `mqk-daemon::state`:
//! a broadcast bus feeding SSE, a periodically-refreshed status snapshot,
//! and a background task driving the controller's heartbeat loop.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};

use crate::bootstrap::StatePaths;
use pcl_controller::Controller;

/// Messages broadcast over the internal event bus and surfaced as SSE
/// events on `/v1/events`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusMsg {
    Heartbeat { ts_unix: i64, cycle: u64 },
    Status(StatusSnapshot),
}

/// Static build metadata included in health / status responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

/// Point-in-time snapshot of agent state, returned by `GET /v1/status` and
/// carried inside SSE `status` events. Read-only by construction — nothing
/// in this crate's HTTP surface can mutate agent state (spec's daemon is
/// observability, not a control plane).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub daemon_uptime_secs: u64,
    pub cycle_count: u64,
    pub live_pool_count: usize,
    pub oracle_armed: bool,
    pub suspended_until: Option<i64>,
    pub last_heartbeat_unix: Option<i64>,
}

/// Cloneable (`Arc`) handle shared across every Axum handler.
pub struct AppState {
    pub bus: broadcast::Sender<BusMsg>,
    pub build: BuildInfo,
    pub status: Arc<RwLock<StatusSnapshot>>,
    pub controller: Arc<Controller>,
    paths: StatePaths,
}

impl AppState {
    /// Build the shared state around an already-assembled controller. Kept
    /// separate from [`crate::bootstrap::bootstrap`] so tests can wire an
    /// `AppState` around a `pcl_testkit`-style controller without touching
    /// the environment.
    pub fn new(controller: Controller, paths: StatePaths) -> Self {
        let (bus, _rx) = broadcast::channel::<BusMsg>(1024);
        let initial_status = StatusSnapshot {
            daemon_uptime_secs: uptime_secs(),
            cycle_count: 0,
            live_pool_count: 0,
            oracle_armed: true,
            suspended_until: None,
            last_heartbeat_unix: None,
        };
        AppState {
            bus,
            build: BuildInfo {
                service: "pcl-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            status: Arc::new(RwLock::new(initial_status)),
            controller: Arc::new(controller),
            paths,
        }
    }
}

/// Monotonically increasing uptime since first call (process lifetime).
pub fn uptime_secs() -> u64 {
    static START: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();
    START.get_or_init(std::time::Instant::now).elapsed().as_secs()
}

/// Drive the controller's heartbeat on a fixed interval, persist the
/// registry snapshot after each cycle, and broadcast the result so any SSE
/// subscriber sees it. `interval` is `AgentRole::heartbeat_interval_secs`,
/// not a hardcoded constant, since the social-only role ticks more slowly
/// than the oracle role.
pub fn spawn_heartbeat_loop(state: Arc<AppState>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let now = chrono::Utc::now().timestamp();
            let report = state.controller.heartbeat(now).await;

            if let Err(err) = pcl_registry::save(&state.paths.registry_snapshot, &*state.controller.registry.read().await) {
                tracing::error!(error = %err, "failed to persist registry snapshot");
            }

            let snapshot = refresh_status(&state).await;
            let _ = state.bus.send(BusMsg::Heartbeat { ts_unix: now, cycle: report.cycle });
            let _ = state.bus.send(BusMsg::Status(snapshot));
        }
    });
}

/// Recompute the status snapshot from live controller state.
pub async fn refresh_status(state: &Arc<AppState>) -> StatusSnapshot {
    let registry = state.controller.registry.read().await;
    let snapshot = StatusSnapshot {
        daemon_uptime_secs: uptime_secs(),
        cycle_count: registry.cycle_count(),
        live_pool_count: registry.live_pool_count(),
        oracle_armed: state.controller.oracle_armed.load(std::sync::atomic::Ordering::SeqCst),
        suspended_until: registry.suspension_expiry_unix(),
        last_heartbeat_unix: registry.last_heartbeat_unix(),
    };
    drop(registry);
    *state.status.write().await = snapshot.clone();
    snapshot
}
