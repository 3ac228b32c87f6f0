//! Cliente de la API de estado de WEAO.
//!
//! Una sola petición GET por ciclo, sin reintentos. Cualquier fallo de
//! transporte, estado HTTP o cuerpo se reporta como "sin datos".

use super::record::Record;
use crate::error::WatchError;
use crate::metrics::MetricsCollector;
use crate::state::{StatusApiConfig, STATUS_USER_AGENT};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// Fallo al consultar o interpretar la API de estado
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    Transport(String),
    Status(u16),
    Decode(String),
    NotAList,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(msg) => write!(f, "transport error: {}", msg),
            FetchError::Status(code) => write!(f, "unexpected HTTP status {}", code),
            FetchError::Decode(msg) => write!(f, "invalid JSON body: {}", msg),
            FetchError::NotAList => write!(f, "top-level JSON value is not a list"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Fuente de registros para el planificador
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// `None` cuando la consulta falla; el fallo ya quedó registrado.
    async fn fetch(&self) -> Option<Vec<Record>>;
}

pub struct StatusFetcher {
    client: reqwest::Client,
    url: String,
}

impl StatusFetcher {
    pub fn new(config: &StatusApiConfig) -> Result<Self, WatchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .user_agent(STATUS_USER_AGENT)
            .build()
            .map_err(|e| WatchError::Http(format!("could not build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn try_fetch(&self) -> Result<Vec<Record>, FetchError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        parse_records(&body)
    }
}

#[async_trait]
impl StatusSource for StatusFetcher {
    async fn fetch(&self) -> Option<Vec<Record>> {
        log::info!("--> [API Fetch] Attempting to pull data from WEAO API...");
        match self.try_fetch().await {
            Ok(records) => {
                log::info!("--> [API Fetch] Success! Data received.");
                Some(records)
            }
            Err(e) => {
                MetricsCollector::increment_fetch_failures();
                log::warn!(
                    "--> [API Fetch] FAILED ({}). An error occurred: {}",
                    self.url,
                    e
                );
                None
            }
        }
    }
}

/// Interpreta el cuerpo como un array JSON de registros.
pub fn parse_records(body: &[u8]) -> Result<Vec<Record>, FetchError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    match value {
        Value::Array(items) => Ok(items.into_iter().filter_map(Record::from_value).collect()),
        _ => Err(FetchError::NotAList),
    }
}
