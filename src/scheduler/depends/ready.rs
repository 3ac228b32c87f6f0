//! Espera de la señal de "listo" de Discord.
//!
//! El planificador no arranca hasta que el bot está conectado. Un token
//! rechazado es fatal; cualquier otro fallo se reintenta con espera fija.

use crate::error::WatchError;
use crate::notify::{BotIdentity, ChatPlatform, NotifyError};
use std::time::Duration;

pub async fn await_ready(
    platform: &dyn ChatPlatform,
    retry_delay: Duration,
) -> Result<BotIdentity, WatchError> {
    loop {
        match platform.ready().await {
            Ok(identity) => {
                log::info!("{} has connected to Discord!", identity.username);
                return Ok(identity);
            }
            Err(NotifyError::Unauthorized) => {
                return Err(WatchError::Config(
                    "Discord rejected TOKEN (401 Unauthorized)".to_string(),
                ));
            }
            Err(e) => {
                log::warn!(
                    "⚠️ Discord is not ready yet: {}. Retrying in {}s",
                    e,
                    retry_delay.as_secs()
                );
                tokio::time::sleep(retry_delay).await;
            }
        }
    }
}
