//! Song records
//!
//! Songs are insert-only. Optional fields are defaulted on the write path so
//! every stored row is complete; see [`NewSong::into_insert`].

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{id_as_string, loose_integer, loose_text, non_empty};

/// Genre assigned when the uploader leaves it blank
pub const DEFAULT_GENRE: &str = "Pop";

/// Tempo assigned when the uploader leaves it blank or zero
pub const DEFAULT_BPM: i64 = 120;

/// Song record from the songs table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    /// Store-assigned id, insertion ordered
    #[serde(serialize_with = "id_as_string")]
    pub id: i64,

    pub title: String,

    /// Artist display name
    pub artist: String,

    /// Loose reference to an artist id (not enforced)
    pub artist_id: Option<String>,

    pub album: String,
    pub genre: String,
    pub year: String,

    /// Free text; doubles as lyrics and credits
    pub description: String,

    pub lyrics: String,
    pub bpm: i64,

    /// Musical key
    #[serde(rename = "key")]
    pub song_key: String,

    pub album_art_url: String,
    pub download_url: String,

    /// External video id
    pub youtube_url: String,
}

/// Song creation payload as posted by the admin console
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub artist_id: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub year: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub lyrics: Option<String>,
    #[serde(default, deserialize_with = "loose_integer")]
    pub bpm: Option<i64>,
    #[serde(default)]
    pub key: Option<String>,
    pub album_art_url: String,
    pub download_url: String,
    #[serde(default)]
    pub youtube_url: Option<String>,
}

/// Fully defaulted column values for one insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongInsert {
    pub title: String,
    pub artist: String,
    pub artist_id: Option<String>,
    pub album: String,
    pub genre: String,
    pub year: String,
    pub description: String,
    pub lyrics: String,
    pub bpm: i64,
    pub song_key: String,
    pub album_art_url: String,
    pub download_url: String,
    pub youtube_url: String,
}

impl NewSong {
    /// Apply write-path defaults
    ///
    /// Blank values count as missing: genre becomes "Pop", year becomes
    /// `current_year`, bpm becomes 120 (also when zero), and every other
    /// optional text field becomes the empty string. A blank artist id is
    /// stored as NULL.
    pub fn into_insert(self, current_year: i32) -> SongInsert {
        SongInsert {
            title: self.title,
            artist: self.artist,
            artist_id: non_empty(self.artist_id),
            album: self.album.unwrap_or_default(),
            genre: non_empty(self.genre).unwrap_or_else(|| DEFAULT_GENRE.to_string()),
            year: non_empty(self.year).unwrap_or_else(|| current_year.to_string()),
            description: self.description.unwrap_or_default(),
            lyrics: self.lyrics.unwrap_or_default(),
            bpm: self.bpm.filter(|bpm| *bpm != 0).unwrap_or(DEFAULT_BPM),
            song_key: self.key.unwrap_or_default(),
            album_art_url: self.album_art_url,
            download_url: self.download_url,
            youtube_url: self.youtube_url.unwrap_or_default(),
        }
    }
}
