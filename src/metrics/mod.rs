//! Módulo de métricas para executor-watch.
//!
//! Recopila y expone métricas del ciclo de consulta y del panel.

pub mod depends;

pub use depends::{GaugeGuard, MetricsCollector};

use crate::error::WatchError;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

/// GET /metrics en formato de texto de Prometheus
pub async fn metrics_handler() -> Result<Response, WatchError> {
    let body = MetricsCollector::gather().map_err(|e| {
        log::warn!("metrics: could not encode metrics: {}", e);
        e
    })?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}
