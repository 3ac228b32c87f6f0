//! Tipos de error para executor-watch.
//!
//! Proporciona errores estructurados con contexto. Solo la configuración de
//! arranque es fatal; el resto se registra y el ciclo continúa.

use std::fmt;

/// Error principal de la aplicación
#[derive(Debug)]
pub enum WatchError {
    /// Variables de entorno ausentes o inválidas, token rechazado
    Config(String),
    /// Errores del panel web
    Dashboard(String),
    /// Fallos al codificar las métricas
    Metrics(String),
    /// Errores de I/O
    Io(std::io::Error),
    /// Errores de parsing
    Parse(String),
    /// Errores HTTP
    Http(String),
}

impl fmt::Display for WatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchError::Config(msg) => write!(f, "Config error: {}", msg),
            WatchError::Dashboard(msg) => write!(f, "Dashboard error: {}", msg),
            WatchError::Metrics(msg) => write!(f, "Metrics error: {}", msg),
            WatchError::Io(err) => write!(f, "IO error: {}", err),
            WatchError::Parse(msg) => write!(f, "Parse error: {}", msg),
            WatchError::Http(msg) => write!(f, "HTTP error: {}", msg),
        }
    }
}

impl std::error::Error for WatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WatchError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for WatchError {
    fn from(err: std::io::Error) -> Self {
        WatchError::Io(err)
    }
}

impl From<serde_json::Error> for WatchError {
    fn from(err: serde_json::Error) -> Self {
        WatchError::Parse(format!("JSON error: {}", err))
    }
}

impl From<prometheus::Error> for WatchError {
    fn from(err: prometheus::Error) -> Self {
        WatchError::Metrics(err.to_string())
    }
}

impl axum::response::IntoResponse for WatchError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            WatchError::Config(_)
            | WatchError::Io(_)
            | WatchError::Dashboard(_)
            | WatchError::Metrics(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            WatchError::Http(_) => axum::http::StatusCode::BAD_GATEWAY,
            WatchError::Parse(_) => axum::http::StatusCode::BAD_REQUEST,
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

/// Result type alias para simplificar el código
pub type Result<T> = std::result::Result<T, WatchError>;
