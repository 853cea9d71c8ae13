//! Song repository

use sqlx::SqlitePool;

use super::utils::SONG_COLUMNS;
use crate::models::{Song, SongInsert};

/// Repository for song database operations
#[derive(Clone)]
pub struct SongRepository {
    pool: SqlitePool,
}

impl SongRepository {
    /// Create a new SongRepository instance
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every song, most recently inserted first
    pub async fn find_all(&self) -> Result<Vec<Song>, sqlx::Error> {
        let sql = format!("SELECT {} FROM songs ORDER BY id DESC", SONG_COLUMNS);
        sqlx::query_as::<_, Song>(&sql)
            .fetch_all(&self.pool)
            .await
    }

    /// Insert one fully defaulted song and return its id
    pub async fn insert(&self, song: &SongInsert) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"INSERT INTO songs (
                title, artist, artist_id, album, genre, year,
                description, lyrics, bpm, song_key,
                album_art_url, download_url, youtube_url
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&song.title)
        .bind(&song.artist)
        .bind(&song.artist_id)
        .bind(&song.album)
        .bind(&song.genre)
        .bind(&song.year)
        .bind(&song.description)
        .bind(&song.lyrics)
        .bind(song.bpm)
        .bind(&song.song_key)
        .bind(&song.album_art_url)
        .bind(&song.download_url)
        .bind(&song.youtube_url)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Get total count of songs
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM songs")
            .fetch_one(&self.pool)
            .await
    }
}
