//! Recopiladores de métricas.
//!
//! Define y registra métricas de Prometheus.

use crate::error::WatchError;
use lazy_static::lazy_static;
use prometheus::{register_int_counter, register_int_gauge, Encoder, IntCounter, IntGauge, TextEncoder};

lazy_static! {
    pub static ref TICKS_TOTAL: IntCounter = register_int_counter!(
        "executor_watch_ticks_total",
        "Total number of scheduler ticks"
    )
    .unwrap();
    pub static ref FETCH_FAILURES_TOTAL: IntCounter = register_int_counter!(
        "executor_watch_fetch_failures_total",
        "Total number of failed status API fetches"
    )
    .unwrap();
    pub static ref TRANSITIONS_TOTAL: IntCounter = register_int_counter!(
        "executor_watch_transitions_total",
        "Total number of unavailable to available transitions detected"
    )
    .unwrap();
    pub static ref NOTIFICATIONS_SENT_TOTAL: IntCounter = register_int_counter!(
        "executor_watch_notifications_sent_total",
        "Total number of Discord notifications delivered"
    )
    .unwrap();
    pub static ref NOTIFICATION_FAILURES_TOTAL: IntCounter = register_int_counter!(
        "executor_watch_notification_failures_total",
        "Total number of Discord notifications that could not be delivered"
    )
    .unwrap();
    pub static ref TRACKED_ITEMS: IntGauge = register_int_gauge!(
        "executor_watch_tracked_items",
        "Number of executors in the live snapshot"
    )
    .unwrap();
    pub static ref DASHBOARD_CLIENTS: IntGauge = register_int_gauge!(
        "executor_watch_dashboard_clients",
        "Number of connected live dashboard clients"
    )
    .unwrap();
}

pub struct MetricsCollector;

impl MetricsCollector {
    pub fn increment_ticks() {
        TICKS_TOTAL.inc();
    }

    pub fn increment_fetch_failures() {
        FETCH_FAILURES_TOTAL.inc();
    }

    pub fn add_transitions(count: usize) {
        TRANSITIONS_TOTAL.inc_by(count as u64);
    }

    pub fn increment_notifications_sent() {
        NOTIFICATIONS_SENT_TOTAL.inc();
    }

    pub fn increment_notification_failures() {
        NOTIFICATION_FAILURES_TOTAL.inc();
    }

    pub fn set_tracked_items(count: usize) {
        TRACKED_ITEMS.set(count as i64);
    }

    /// Cuenta un cliente del panel mientras viva el guard devuelto.
    pub fn track_dashboard_client() -> GaugeGuard {
        GaugeGuard::new(DASHBOARD_CLIENTS.clone())
    }

    pub fn gather() -> Result<String, WatchError> {
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| WatchError::Metrics(e.to_string()))
    }
}

/// Incrementa un gauge al crearse y lo decrementa al soltarse, también
/// cuando el futuro que lo contiene se cancela.
pub struct GaugeGuard {
    gauge: IntGauge,
}

impl GaugeGuard {
    pub fn new(gauge: IntGauge) -> Self {
        gauge.inc();
        Self { gauge }
    }
}

impl Drop for GaugeGuard {
    fn drop(&mut self) {
        self.gauge.dec();
    }
}
