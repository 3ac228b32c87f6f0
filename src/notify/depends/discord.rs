//! Cliente REST de Discord.
//!
//! Solo lo necesario para un bot emisor: identidad (`/users/@me`), búsqueda
//! de canal y envío de mensajes. Nunca lee mensajes entrantes.

use super::embed::OutgoingMessage;
use crate::error::WatchError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";
const DISCORD_CDN: &str = "https://cdn.discordapp.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Fallo al enviar una notificación
#[derive(Debug, Clone, PartialEq)]
pub enum NotifyError {
    /// El canal no existe o el bot no lo ve
    ChannelNotFound(u64),
    /// El canal existe pero no admite mensajes de texto
    WrongChannelType { channel_id: u64, kind: u8 },
    /// Faltan permisos en el canal
    Forbidden(u64),
    /// El token del bot fue rechazado
    Unauthorized,
    /// Cualquier otra respuesta no exitosa
    Rejected { status: u16, body: String },
    Transport(String),
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyError::ChannelNotFound(id) | NotifyError::WrongChannelType { channel_id: id, .. } => {
                write!(f, "Channel {} not found or not a text channel.", id)
            }
            NotifyError::Forbidden(id) => write!(f, "Missing permissions in channel {}.", id),
            NotifyError::Unauthorized => write!(f, "Discord rejected the bot token (401)."),
            NotifyError::Rejected { status, body } => {
                write!(f, "Discord answered HTTP {}: {}", status, body)
            }
            NotifyError::Transport(msg) => write!(f, "transport error: {}", msg),
        }
    }
}

impl std::error::Error for NotifyError {}

/// Identidad del bot una vez conectado
#[derive(Debug, Clone, PartialEq)]
pub struct BotIdentity {
    pub id: String,
    pub username: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelInfo {
    pub id: u64,
    pub kind: u8,
}

impl ChannelInfo {
    /// Texto de servidor (0) y anuncios (5)
    pub fn is_text(&self) -> bool {
        matches!(self.kind, 0 | 5)
    }
}

/// Plataforma de chat vista como sumidero de mensajes
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Señal de "listo": la conexión está establecida y el token es válido.
    async fn ready(&self) -> Result<BotIdentity, NotifyError>;

    async fn channel(&self, channel_id: u64) -> Result<ChannelInfo, NotifyError>;

    /// Devuelve el id del mensaje creado.
    async fn send(&self, channel_id: u64, message: &OutgoingMessage) -> Result<String, NotifyError>;
}

#[derive(Deserialize)]
struct UserPayload {
    id: String,
    username: String,
    avatar: Option<String>,
}

#[derive(Deserialize)]
struct ChannelPayload {
    #[serde(rename = "type")]
    kind: u8,
}

#[derive(Deserialize)]
struct MessagePayload {
    id: String,
}

pub struct DiscordClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl DiscordClient {
    pub fn new(token: String) -> Result<Self, WatchError> {
        Self::with_base_url(token, DISCORD_API_BASE)
    }

    pub fn with_base_url(token: String, base_url: &str) -> Result<Self, WatchError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(
                "DiscordBot (https://weao.xyz, ",
                env!("CARGO_PKG_VERSION"),
                ")"
            ))
            .build()
            .map_err(|e| WatchError::Http(format!("could not build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.token)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        channel_id: Option<u64>,
    ) -> Result<T, NotifyError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        decode(resp, channel_id).await
    }
}

async fn decode<T: for<'de> Deserialize<'de>>(
    resp: reqwest::Response,
    channel_id: Option<u64>,
) -> Result<T, NotifyError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(classify(status, channel_id, body));
    }
    resp.json::<T>()
        .await
        .map_err(|e| NotifyError::Transport(format!("invalid Discord response: {}", e)))
}

/// Traduce una respuesta no exitosa de Discord.
pub fn classify(status: StatusCode, channel_id: Option<u64>, body: String) -> NotifyError {
    match (status, channel_id) {
        (StatusCode::UNAUTHORIZED, _) => NotifyError::Unauthorized,
        (StatusCode::NOT_FOUND, Some(id)) => NotifyError::ChannelNotFound(id),
        (StatusCode::FORBIDDEN, Some(id)) => NotifyError::Forbidden(id),
        _ => NotifyError::Rejected {
            status: status.as_u16(),
            body,
        },
    }
}

pub fn avatar_url(user_id: &str, avatar_hash: &str) -> String {
    let ext = if avatar_hash.starts_with("a_") { "gif" } else { "png" };
    format!("{}/avatars/{}/{}.{}", DISCORD_CDN, user_id, avatar_hash, ext)
}

#[async_trait]
impl ChatPlatform for DiscordClient {
    async fn ready(&self) -> Result<BotIdentity, NotifyError> {
        let user: UserPayload = self.get_json("/users/@me", None).await?;
        let avatar_url = user.avatar.as_deref().map(|hash| avatar_url(&user.id, hash));
        Ok(BotIdentity {
            id: user.id,
            username: user.username,
            avatar_url,
        })
    }

    async fn channel(&self, channel_id: u64) -> Result<ChannelInfo, NotifyError> {
        let channel: ChannelPayload = self
            .get_json(&format!("/channels/{}", channel_id), Some(channel_id))
            .await?;
        Ok(ChannelInfo {
            id: channel_id,
            kind: channel.kind,
        })
    }

    async fn send(&self, channel_id: u64, message: &OutgoingMessage) -> Result<String, NotifyError> {
        let resp = self
            .http
            .post(format!("{}/channels/{}/messages", self.base_url, channel_id))
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(message)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        let created: MessagePayload = decode(resp, Some(channel_id)).await?;
        Ok(created.id)
    }
}
