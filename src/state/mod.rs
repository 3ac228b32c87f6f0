//! Configuración del proceso, leída una sola vez del entorno al arrancar.
//!
//! Separa las responsabilidades en structs pequeños: bot, API de estado y
//! panel web.

use crate::error::{Result, WatchError};
use log::LevelFilter;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// Cadencia fija del ciclo de consulta
pub const POLL_INTERVAL: Duration = Duration::from_secs(120);
/// Límite de conexión y de la petición completa a la API de estado
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
/// Espera entre intentos de la señal de "listo" de Discord
pub const READY_RETRY_DELAY: Duration = Duration::from_secs(5);

pub const DEFAULT_STATUS_API_URL: &str = "https://weao.xyz/api/status/exploits";
pub const STATUS_USER_AGENT: &str = "WEAO-3PService";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Configuración del bot de Discord
#[derive(Clone)]
pub struct BotConfig {
    pub token: String,
    pub channel_id: u64,
    /// URL pública del panel, enlazada desde cada notificación
    pub public_url: String,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &mask_token(&self.token))
            .field("channel_id", &self.channel_id)
            .field("public_url", &self.public_url)
            .finish()
    }
}

/// Configuración de la API de estado
#[derive(Clone, Debug)]
pub struct StatusApiConfig {
    pub url: String,
    pub timeout: Duration,
}

/// Configuración del panel web
#[derive(Clone, Debug)]
pub struct DashboardConfig {
    pub listen_addr: SocketAddr,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bot: BotConfig,
    pub status_api: StatusApiConfig,
    pub dashboard: DashboardConfig,
    pub log_level: LevelFilter,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = required(&lookup, "TOKEN")?;

        let raw_channel = required(&lookup, "CHANNEL_ID")?;
        let channel_id = raw_channel.trim().parse::<u64>().map_err(|_| {
            WatchError::Config(format!("CHANNEL_ID must be a numeric id, got '{}'", raw_channel))
        })?;

        let public_url = lookup("RENDER_EXTERNAL_URL").unwrap_or_default();

        let listen_raw = lookup("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen_raw
            .parse::<SocketAddr>()
            .map_err(|e| WatchError::Config(format!("LISTEN_ADDR '{}': {}", listen_raw, e)))?;

        let status_url =
            lookup("STATUS_API_URL").unwrap_or_else(|| DEFAULT_STATUS_API_URL.to_string());
        url::Url::parse(&status_url)
            .map_err(|e| WatchError::Config(format!("STATUS_API_URL '{}': {}", status_url, e)))?;

        let log_level = crate::logs::parse_level(lookup("LOG_LEVEL").as_deref())?;

        Ok(Self {
            bot: BotConfig {
                token,
                channel_id,
                public_url,
            },
            status_api: StatusApiConfig {
                url: status_url,
                timeout: FETCH_TIMEOUT,
            },
            dashboard: DashboardConfig { listen_addr },
            log_level,
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(WatchError::Config(format!("{} is not set", key))),
    }
}

/// Oculta un secreto para los logs: tres primeros caracteres y el resto con asteriscos.
pub fn mask_token(token: &str) -> String {
    let n = token.chars().count();
    if n <= 4 {
        return "*".repeat(n);
    }
    let prefix: String = token.chars().take(3).collect();
    format!("{}{}", prefix, "*".repeat(n - 3))
}
