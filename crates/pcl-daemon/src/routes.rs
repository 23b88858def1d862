//! Axum router and handlers for pcl-daemon, grounded on `mqk-daemon::routes`
//! — with every write endpoint dropped. This surface is observability only:
//! `/v1/health`, `/v1/status`, and an SSE `/v1/events` heartbeat stream.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::api_types::HealthResponse;
use crate::state::{refresh_status, AppState, BusMsg};

/// Build the complete application router wired to the given shared state.
/// Middleware (CORS, tracing) is attached by `main.rs`, not here, so tests
/// can exercise the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/v1/status", get(status_handler))
        .route("/v1/events", get(events))
        .with_state(state)
}

async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service,
            version: st.build.version,
        }),
    )
}

async fn status_handler(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = refresh_status(&st).await;
    let _ = st.bus.send(BusMsg::Status(snapshot.clone()));
    (StatusCode::OK, Json(snapshot))
}

async fn events(State(st): State<Arc<AppState>>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
    headers.insert("Connection", HeaderValue::from_static("keep-alive"));

    let rx = st.bus.subscribe();
    let stream = broadcast_to_sse(rx);
    (headers, Sse::new(stream).keep_alive(KeepAlive::new())).into_response()
}

fn broadcast_to_sse(rx: broadcast::Receiver<BusMsg>) -> impl Stream<Item = Result<Event, Infallible>> {
    BroadcastStream::new(rx).filter_map(|msg| async move {
        match msg {
            Ok(m) => {
                let event_name = match &m {
                    BusMsg::Heartbeat { .. } => "heartbeat",
                    BusMsg::Status(_) => "status",
                };
                let data = serde_json::to_string(&m).ok()?;
                Some(Ok(Event::default().event(event_name).data(data)))
            }
            Err(_) => None,
        }
    })
}
