//! Panel web en vivo.
//!
//! Sirve una página estática, el WebSocket de logs y dos endpoints de solo
//! lectura (`/api/status`, `/api/logs`) más `/metrics`.

pub mod depends;

pub use depends::websocket::{DashboardEvent, LogSocket};

use crate::error::Result;
use crate::metrics::metrics_handler;
use crate::AppState;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

const INDEX_HTML: &str = include_str!("../../static/index.html");

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/ws", get(logs_ws_handler))
        .route("/api/status", get(status_handler))
        .route("/api/logs", get(history_handler))
        .route("/metrics", get(metrics_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(listen_addr: SocketAddr, state: Arc<AppState>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    log::info!("🚀 Live status page listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn logs_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let handler = LogSocket::new(Arc::clone(&state.logs));
    ws.on_upgrade(move |socket| async move { handler.handle_connection(socket).await })
}

async fn status_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let tracker = state.tracker.borrow().clone();
    let uptime_seconds = std::time::SystemTime::now()
        .duration_since(state.start_time)
        .unwrap_or_default()
        .as_secs();
    Json(json!({
        "ready": tracker.ready,
        "bot_user": tracker.bot_user,
        "tracking": tracker.tracking,
        "tracked_items": tracker.tracked_items,
        "ticks": tracker.ticks,
        "last_check_utc": tracker.last_check_utc,
        "last_success_utc": tracker.last_success_utc,
        "uptime_seconds": uptime_seconds,
        "dashboard_clients": state.logs.subscriber_count(),
    }))
}

async fn history_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.logs.history())
}
