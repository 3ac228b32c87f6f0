pub mod dashboard;
pub mod error;
pub mod logs;
pub mod metrics;
pub mod notify;
pub mod scheduler;
pub mod state;
pub mod status;

use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::watch;

use logs::LogHub;
use scheduler::TrackerStatus;

/// Estado compartido con los handlers del panel
#[derive(Clone)]
pub struct AppState {
    // Historial y difusión de logs hacia el navegador
    pub logs: Arc<LogHub>,
    // Resumen publicado por el planificador tras cada ciclo
    pub tracker: watch::Receiver<TrackerStatus>,
    // Timestamp de inicio para calcular uptime
    pub start_time: SystemTime,
}

impl AppState {
    pub fn new(logs: Arc<LogHub>, tracker: watch::Receiver<TrackerStatus>) -> Self {
        Self {
            logs,
            tracker,
            start_time: SystemTime::now(),
        }
    }
}
