//! Artist repository

use sqlx::SqlitePool;

use super::utils::ARTIST_COLUMNS;
use crate::models::{Artist, NewArtist};

/// Repository for artist database operations
#[derive(Clone)]
pub struct ArtistRepository {
    pool: SqlitePool,
}

impl ArtistRepository {
    /// Create a new ArtistRepository instance
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every artist, ordered by name
    pub async fn find_all(&self) -> Result<Vec<Artist>, sqlx::Error> {
        let sql = format!("SELECT {} FROM artists ORDER BY name ASC", ARTIST_COLUMNS);
        sqlx::query_as::<_, Artist>(&sql)
            .fetch_all(&self.pool)
            .await
    }

    /// Insert one artist; a missing description is stored as ""
    pub async fn insert(&self, artist: &NewArtist) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO artists (name, artist_type, image_url, description) VALUES (?, ?, ?, ?)",
        )
        .bind(&artist.name)
        .bind(&artist.artist_type)
        .bind(&artist.image_url)
        .bind(artist.description.as_deref().unwrap_or(""))
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Get total count of artists
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM artists")
            .fetch_one(&self.pool)
            .await
    }
}
