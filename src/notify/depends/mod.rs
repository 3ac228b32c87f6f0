//! Submódulos dependientes para el módulo de notificaciones.

pub mod discord;
pub mod embed;

pub use discord::{BotIdentity, ChannelInfo, ChatPlatform, DiscordClient, NotifyError};
pub use embed::{build_message, render_embed, Embed, EmbedContext, EmbedField, OutgoingMessage};
