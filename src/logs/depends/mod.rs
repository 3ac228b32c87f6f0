//! Submódulos dependientes para el módulo de logs.

pub mod hub;
pub mod logger;

pub use hub::{format_line, LogHub, LOG_HISTORY_CAPACITY};
pub use logger::{parse_level, HubLogger};
