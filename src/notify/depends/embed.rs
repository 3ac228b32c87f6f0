//! Construcción del embed de Discord para una transición.
//!
//! Los structs serializan con la forma que espera `POST /channels/{id}/messages`.

use crate::status::{Record, Transition};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Verde de marca de Discord
pub const BRAND_GREEN: u32 = 0x57F287;
pub const AUTHOR_ICON_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/twemoji/14.0.2/72x72/1f7e2.png";
const NOT_AVAILABLE: &str = "N/A";
/// Carácter braille en blanco; Discord no acepta campos vacíos
const BLANK: &str = "\u{2800}";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedAuthor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub icon_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
    pub icon_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub timestamp: String,
    pub author: EmbedAuthor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllowedMentions {
    pub parse: Vec<String>,
}

impl AllowedMentions {
    pub fn everyone() -> Self {
        Self {
            parse: vec!["everyone".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingMessage {
    pub content: String,
    pub embeds: Vec<Embed>,
    pub allowed_mentions: AllowedMentions,
}

/// Datos del bot y del despliegue que aparecen en el embed
#[derive(Debug, Clone, Default)]
pub struct EmbedContext {
    pub public_url: String,
    pub bot_avatar_url: Option<String>,
}

fn field(name: &str, value: impl Into<String>, inline: bool) -> EmbedField {
    EmbedField {
        name: name.to_string(),
        value: value.into(),
        inline,
    }
}

fn code(value: Option<&str>, fallback: &str) -> String {
    format!("`{}`", value.unwrap_or(fallback))
}

pub fn quick_links(record: &Record) -> Option<String> {
    let attrs = &record.display;
    let links: Vec<String> = [
        ("Official Website", attrs.website_link.as_deref()),
        ("Discord Server", attrs.discord_link.as_deref()),
        ("Purchase Here", attrs.purchase_link.as_deref()),
    ]
    .into_iter()
    .filter_map(|(label, link)| link.map(|url| format!("**[{}]({})**", label, url)))
    .collect();

    if links.is_empty() {
        None
    } else {
        Some(links.join(" | "))
    }
}

pub fn render_fields(record: &Record, public_url: &str) -> Vec<EmbedField> {
    let attrs = &record.display;

    let detected = if attrs.detected { "Yes ;(" } else { "No :3" };
    let price = if attrs.free {
        "Free".to_string()
    } else {
        code(attrs.cost.as_deref(), "Paid")
    };
    let key_system = if attrs.key_system { "Yes" } else { "No" };

    let mut fields = vec![
        field("Detected by Hyperion?", detected, true),
        field("Roblox Version", code(attrs.roblox_version.as_deref(), NOT_AVAILABLE), true),
        field(BLANK, BLANK, true),
        field("Price", price, true),
        field("Key System?", key_system, true),
        field("Version", code(attrs.version.as_deref(), NOT_AVAILABLE), true),
    ];

    if let Some(links) = quick_links(record) {
        fields.push(field("🔗 Quick Links", links, false));
    }

    fields.push(field(
        "Bot Status",
        format!("**[Click here to view the live status page.]({})**", public_url),
        false,
    ));
    fields
}

pub fn render_embed(transition: &Transition, ctx: &EmbedContext, now: DateTime<Utc>) -> Embed {
    let current = &transition.current;

    let footer = ctx.bot_avatar_url.as_ref().map(|icon| EmbedFooter {
        text: format!(
            "WEAO Status Bot • {}",
            current.display.updated_date.as_deref().unwrap_or(NOT_AVAILABLE)
        ),
        icon_url: icon.clone(),
    });

    Embed {
        title: format!("✅ {} is Back Online!", transition.name),
        description: "This executor OR external has just been updated.".to_string(),
        color: BRAND_GREEN,
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        author: EmbedAuthor {
            name: "Bot Status".to_string(),
            url: Some(ctx.public_url.clone()).filter(|u| !u.is_empty()),
            icon_url: AUTHOR_ICON_URL.to_string(),
        },
        footer,
        fields: render_fields(current, &ctx.public_url),
    }
}

pub fn build_message(transition: &Transition, ctx: &EmbedContext, now: DateTime<Utc>) -> OutgoingMessage {
    OutgoingMessage {
        content: "@everyone".to_string(),
        embeds: vec![render_embed(transition, ctx, now)],
        allowed_mentions: AllowedMentions::everyone(),
    }
}
