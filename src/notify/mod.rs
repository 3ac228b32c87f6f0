//! Módulo de notificaciones para executor-watch.
//!
//! Renderiza una transición como embed y la envía al canal fijo, delegando
//! el formato y el cliente de Discord a los submódulos en `depends/`.

pub mod depends;

pub use depends::{
    build_message, render_embed, BotIdentity, ChannelInfo, ChatPlatform, DiscordClient, Embed,
    EmbedContext, EmbedField, NotifyError, OutgoingMessage,
};

use crate::metrics::MetricsCollector;
use crate::status::Transition;
use chrono::Utc;
use std::sync::Arc;

/// Resultado de un envío exitoso
#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    pub channel_id: u64,
    pub message_id: String,
}

pub struct Notifier {
    platform: Arc<dyn ChatPlatform>,
    channel_id: u64,
    context: EmbedContext,
}

impl Notifier {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        channel_id: u64,
        public_url: String,
        bot: &BotIdentity,
    ) -> Self {
        Self {
            platform,
            channel_id,
            context: EmbedContext {
                public_url,
                bot_avatar_url: bot.avatar_url.clone(),
            },
        }
    }

    pub fn channel_id(&self) -> u64 {
        self.channel_id
    }

    /// Envía la notificación de una transición. Registra el resultado; el
    /// error se devuelve para que el llamador decida, nunca aborta el ciclo.
    pub async fn notify(&self, transition: &Transition) -> Result<Sent, NotifyError> {
        match self.dispatch(transition).await {
            Ok(sent) => {
                MetricsCollector::increment_notifications_sent();
                log::info!("Sent polished embed notification for {}.", transition.name);
                Ok(sent)
            }
            Err(e) => {
                MetricsCollector::increment_notification_failures();
                match &e {
                    NotifyError::ChannelNotFound(_)
                    | NotifyError::WrongChannelType { .. }
                    | NotifyError::Forbidden(_) => log::error!("Error: {}", e),
                    _ => log::error!(
                        "An unexpected error occurred while notifying {}: {}",
                        transition.name,
                        e
                    ),
                }
                Err(e)
            }
        }
    }

    async fn dispatch(&self, transition: &Transition) -> Result<Sent, NotifyError> {
        let channel = self.platform.channel(self.channel_id).await?;
        if !channel.is_text() {
            return Err(NotifyError::WrongChannelType {
                channel_id: channel.id,
                kind: channel.kind,
            });
        }

        let message = build_message(transition, &self.context, Utc::now());
        let message_id = self.platform.send(self.channel_id, &message).await?;
        Ok(Sent {
            channel_id: self.channel_id,
            message_id,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Plataforma falsa que registra los envíos y permite fallar por nombre.
    #[derive(Default)]
    pub(crate) struct RecordingPlatform {
        pub channel_kind: Option<u8>,
        pub fail_for: HashMap<String, NotifyError>,
        pub sent: Mutex<Vec<(u64, OutgoingMessage)>>,
        pub ready_failures: Mutex<Vec<NotifyError>>,
    }

    impl RecordingPlatform {
        pub(crate) fn text_channel() -> Self {
            Self {
                channel_kind: Some(0),
                ..Default::default()
            }
        }

        pub(crate) fn sent_titles(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .flat_map(|(_, m)| m.embeds.iter().map(|e| e.title.clone()))
                .collect()
        }
    }

    #[async_trait]
    impl ChatPlatform for RecordingPlatform {
        async fn ready(&self) -> Result<BotIdentity, NotifyError> {
            if let Some(err) = self.ready_failures.lock().unwrap().pop() {
                return Err(err);
            }
            Ok(BotIdentity {
                id: "1".into(),
                username: "weao-bot".into(),
                avatar_url: None,
            })
        }

        async fn channel(&self, channel_id: u64) -> Result<ChannelInfo, NotifyError> {
            match self.channel_kind {
                Some(kind) => Ok(ChannelInfo { id: channel_id, kind }),
                None => Err(NotifyError::ChannelNotFound(channel_id)),
            }
        }

        async fn send(&self, channel_id: u64, message: &OutgoingMessage) -> Result<String, NotifyError> {
            let title = message.embeds.first().map(|e| e.title.clone()).unwrap_or_default();
            if let Some((_, err)) = self.fail_for.iter().find(|(name, _)| title.contains(name.as_str())) {
                return Err(err.clone());
            }
            let mut sent = self.sent.lock().unwrap();
            sent.push((channel_id, message.clone()));
            Ok(format!("msg-{}", sent.len()))
        }
    }
}
