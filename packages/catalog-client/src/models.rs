//! Catalog and profile models as seen by clients

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

/// Genre shown for songs whose stored genre is missing
const DEFAULT_GENRE: &str = "Pop";

/// Tempo shown for songs whose stored bpm is missing or zero
const DEFAULT_BPM: i64 = 120;

/// A catalog song, normalized for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Empty when the song is not linked to an artist record
    pub artist_id: String,
    pub album: String,
    pub genre: String,
    /// Empty when unknown
    pub year: String,
    pub description: String,
    pub lyrics: String,
    pub bpm: i64,
    pub key: String,
    pub album_art_url: String,
    pub download_url: String,
    pub youtube_url: String,
}

/// A catalog artist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub artist_type: String,
    pub image_url: String,
    pub description: String,
}

/// Artist together with the number of catalog songs credited to them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistWithSongCount {
    #[serde(flatten)]
    pub artist: Artist,
    pub song_count: usize,
}

/// A genre and how many songs carry it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

/// Songs sharing an album name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Album {
    pub name: String,
    pub songs: Vec<Song>,
}

/// Songs released in the same year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearGroup {
    pub year: String,
    pub songs: Vec<Song>,
}

/// Song creation payload
///
/// Blank optional fields are filled in by the edge API.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<String>,
    pub album: String,
    pub genre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    pub description: String,
    pub lyrics: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bpm: Option<i64>,
    pub key: String,
    pub album_art_url: String,
    pub download_url: String,
    pub youtube_url: String,
}

/// Artist creation payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArtist {
    pub name: String,
    #[serde(rename = "type")]
    pub artist_type: String,
    pub image_url: String,
    pub description: String,
}

// Wire rows before normalization. Ids may arrive as numbers or strings, and
// a mistyped field falls back to its display default instead of failing the
// whole list.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawSong {
    #[serde(default)]
    pub id: serde_json::Value,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub artist: Option<String>,
    #[serde(default)]
    pub artist_id: serde_json::Value,
    #[serde(default, deserialize_with = "lenient_text")]
    pub album: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub genre: Option<String>,
    #[serde(default)]
    pub year: serde_json::Value,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub lyrics: Option<String>,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub bpm: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub album_art_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub download_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub youtube_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawArtist {
    #[serde(default)]
    pub id: serde_json::Value,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient_text")]
    pub artist_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
}

/// Accept a string, number or bool as text; anything else reads as missing
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Accept an integer, float or numeric string; anything else reads as missing
fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        serde_json::Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.round() as i64))
        }
        _ => None,
    })
}

/// Render a JSON scalar as text; null and missing become ""
fn stringify(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

impl From<RawSong> for Song {
    fn from(raw: RawSong) -> Self {
        Self {
            id: stringify(raw.id),
            title: raw.title.unwrap_or_default(),
            artist: raw.artist.unwrap_or_default(),
            artist_id: stringify(raw.artist_id),
            album: raw.album.unwrap_or_default(),
            genre: raw
                .genre
                .filter(|g| !g.is_empty())
                .unwrap_or_else(|| DEFAULT_GENRE.to_string()),
            year: stringify(raw.year),
            description: raw.description.unwrap_or_default(),
            lyrics: raw.lyrics.unwrap_or_default(),
            bpm: raw.bpm.filter(|b| *b != 0).unwrap_or(DEFAULT_BPM),
            key: raw.key.unwrap_or_default(),
            album_art_url: raw.album_art_url.unwrap_or_default(),
            download_url: raw.download_url.unwrap_or_default(),
            youtube_url: raw.youtube_url.unwrap_or_default(),
        }
    }
}

impl From<RawArtist> for Artist {
    fn from(raw: RawArtist) -> Self {
        Self {
            id: stringify(raw.id),
            name: raw.name.unwrap_or_default(),
            artist_type: raw.artist_type.unwrap_or_default(),
            image_url: raw.image_url.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
        }
    }
}

/// Profile gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

/// Profile role; admins may use the catalog admin console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Identity provider session, as far as this crate cares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Session subject; also the profile document id
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Durable per-user profile document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub role: Role,
    /// Liked song ids; may reference songs no longer in the catalog
    #[serde(default)]
    pub liked_songs: BTreeSet<String>,
}

impl UserProfile {
    /// Profile created on first sign-in
    pub fn default_for(session: &Session) -> Self {
        Self {
            uid: session.uid.clone(),
            email: session.email.clone(),
            display_name: Some(
                session
                    .display_name
                    .clone()
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| "New User".to_string()),
            ),
            photo_url: None,
            gender: Gender::Other,
            role: Role::User,
            liked_songs: BTreeSet::new(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn has_liked(&self, song_id: &str) -> bool {
        self.liked_songs.contains(song_id)
    }

    /// Merge a partial update into this profile
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(name) = &update.display_name {
            self.display_name = Some(name.clone());
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(photo) = &update.photo_url {
            self.photo_url = Some(photo.clone());
        }
    }
}

/// Fields editable from the account page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}
