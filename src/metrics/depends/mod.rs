//! Submódulos dependientes para el módulo de métricas.

pub mod collectors;

pub use collectors::{GaugeGuard, MetricsCollector};
