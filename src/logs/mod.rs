//! Módulo de logs para executor-watch.
//!
//! Gestiona el registro del proceso y el historial que consume el panel en
//! vivo, delegando la lógica a los submódulos en `depends/`.

pub mod depends;

pub use depends::{format_line, parse_level, HubLogger, LogHub, LOG_HISTORY_CAPACITY};

use log::LevelFilter;
use std::sync::Arc;

/// Crea el hub del panel e instala el logger global que lo alimenta.
pub fn init_logging(level: LevelFilter) -> crate::error::Result<Arc<LogHub>> {
    let hub = Arc::new(LogHub::new(LOG_HISTORY_CAPACITY));
    HubLogger::install(Arc::clone(&hub), level)?;
    Ok(hub)
}
