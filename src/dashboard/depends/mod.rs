//! Submódulos dependientes para el panel web.

pub mod websocket;

pub use websocket::{DashboardEvent, LogSocket};
