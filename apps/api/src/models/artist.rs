//! Artist records

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::id_as_string;

/// Artist record from the artists table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    #[serde(serialize_with = "id_as_string")]
    pub id: i64,

    pub name: String,

    /// Free-text role or genre label, e.g. "Pop Singer"
    #[serde(rename = "type")]
    pub artist_type: String,

    pub image_url: String,

    pub description: String,
}

/// Artist creation input
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArtist {
    pub name: String,
    #[serde(rename = "type")]
    pub artist_type: String,
    pub image_url: String,
    #[serde(default)]
    pub description: Option<String>,
}
