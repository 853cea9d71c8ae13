//! Catalog records and insert payloads
//!
//! Rows are read with SQLx and rendered as camelCase JSON. Row ids are
//! integers in the store but opaque strings on the wire.

pub mod artist;
pub mod song;

pub use artist::{Artist, NewArtist};
pub use song::{NewSong, Song, SongInsert};

use serde::{Deserialize, Deserializer, Serializer};

/// Render an integer row id as a JSON string
pub(crate) fn id_as_string<S>(id: &i64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(id)
}

/// Accept a JSON string, number or null for a free-text field
///
/// Admin forms send `year` and `artistId` either way.
pub(crate) fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "expected string or number, got {}",
                other
            )))
        }
    })
}

/// Accept a JSON integer, numeric string or null
pub(crate) fn loose_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("number out of range")),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid integer: {}", s))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected integer, got {}",
            other
        ))),
    }
}

/// Treat empty strings like missing values
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
