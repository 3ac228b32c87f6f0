//! Registro de un executor tal como lo reporta la API de estado.
//!
//! La API no garantiza tipos; los campos se leen de forma tolerante y lo que
//! falta se muestra como "N/A" al renderizar.

use serde::Serialize;
use serde_json::{Map, Value};

/// Atributos que solo se usan para mostrar; nunca participan en la comparación.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DisplayAttributes {
    pub detected: bool,
    pub roblox_version: Option<String>,
    pub version: Option<String>,
    pub free: bool,
    pub cost: Option<String>,
    pub key_system: bool,
    pub website_link: Option<String>,
    pub discord_link: Option<String>,
    pub purchase_link: Option<String>,
    pub updated_date: Option<String>,
    /// Campos desconocidos, conservados tal cual
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub name: String,
    /// `None` cuando la API no trae un booleano en `updateStatus`
    pub available: Option<bool>,
    pub display: DisplayAttributes,
}

impl Record {
    pub fn new(name: impl Into<String>, available: bool) -> Self {
        Self {
            name: name.into(),
            available: Some(available),
            display: DisplayAttributes::default(),
        }
    }

    /// Convierte un elemento del array JSON. Un `title` numérico o booleano
    /// se usa como texto; sin `title`, con `null` o con un valor compuesto el
    /// elemento se descarta porque no hay clave estable.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut fields) = value else {
            return None;
        };
        let name = match fields.remove("title")? {
            Value::String(title) => title,
            scalar @ (Value::Number(_) | Value::Bool(_)) => scalar.to_string(),
            Value::Null | Value::Array(_) | Value::Object(_) => return None,
        };
        let available = fields.remove("updateStatus").and_then(|v| v.as_bool());

        let display = DisplayAttributes {
            detected: take_flag(&mut fields, "detected"),
            roblox_version: take_text(&mut fields, "rbxversion"),
            version: take_text(&mut fields, "version"),
            free: take_flag(&mut fields, "free"),
            cost: take_text(&mut fields, "cost"),
            key_system: take_flag(&mut fields, "keysystem"),
            website_link: take_link(&mut fields, "websitelink"),
            discord_link: take_link(&mut fields, "discordlink"),
            purchase_link: take_link(&mut fields, "purchaselink"),
            updated_date: take_text(&mut fields, "updatedDate"),
            extra: fields,
        };

        Some(Self {
            name,
            available,
            display,
        })
    }
}

fn take_flag(fields: &mut Map<String, Value>, key: &str) -> bool {
    fields.remove(key).map(|v| truthy(&v)).unwrap_or(false)
}

fn take_text(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn take_link(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    take_text(fields, key).filter(|link| !link.trim().is_empty())
}

/// Veracidad al estilo JSON: `false`, `0`, `""`, `[]`, `{}` y `null` son falsos.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
