//! Piezas del planificador: espera de arranque y estado del rastreo.

pub mod ready;
pub mod tracker;
