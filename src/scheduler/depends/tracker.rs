//! Estado del seguimiento y resumen publicado tras cada ciclo.

use crate::status::Snapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// `Uninitialized` hasta la primera consulta exitosa; después siempre `Tracking`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TrackerState {
    #[default]
    Uninitialized,
    Tracking(Snapshot),
}

impl TrackerState {
    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            TrackerState::Uninitialized => None,
            TrackerState::Tracking(snapshot) => Some(snapshot),
        }
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self, TrackerState::Tracking(_))
    }
}

/// Lo que ocurrió en un ciclo
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// La consulta falló; el snapshot no cambió
    Skipped,
    /// Consulta de siembra: snapshot inicializado sin notificar
    Seeded { items: usize },
    Checked {
        items: usize,
        transitions: usize,
        sent: usize,
        failed: usize,
    },
}

/// Resumen de solo lectura que consume `GET /api/status`
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrackerStatus {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_user: Option<String>,
    pub tracking: bool,
    pub tracked_items: usize,
    pub ticks: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_check_utc: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_success_utc: Option<DateTime<Utc>>,
}
