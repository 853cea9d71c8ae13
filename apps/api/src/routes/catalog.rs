//! Catalog HTTP route handlers
//!
//! - `GET /api/songs` - every song, newest first
//! - `GET /api/artists` - every artist, by name
//! - `POST /api/songs` - insert one song (upload secret required)
//! - `POST /api/artists` - insert one artist (upload secret required)
//!
//! The catalog is small and always returned whole; there is no pagination.

use axum::{body::Bytes, extract::State, http::Method, routing::get, Json, Router};
use chrono::Datelike;
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::middleware::RequireUploadSecret;
use crate::models::{Artist, NewArtist, NewSong, Song};
use crate::repositories::{ArtistRepository, SongRepository};

/// Shared state for catalog handlers
#[derive(Clone)]
pub struct CatalogState {
    pub songs: SongRepository,
    pub artists: ArtistRepository,
}

impl CatalogState {
    pub fn new(songs: SongRepository, artists: ArtistRepository) -> Self {
        Self { songs, artists }
    }
}

/// Body returned by successful inserts
#[derive(Debug, Serialize)]
pub struct Created {
    pub success: bool,
}

/// Create the catalog router
pub fn catalog_router(state: CatalogState) -> Router {
    Router::new()
        .route(
            "/api/songs",
            get(list_songs)
                .post(create_song)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/artists",
            get(list_artists)
                .post(create_artist)
                .fallback(method_not_allowed),
        )
        .with_state(state)
}

async fn list_songs(State(state): State<CatalogState>) -> ApiResult<Json<Vec<Song>>> {
    let songs = state.songs.find_all().await?;
    tracing::debug!(count = songs.len(), "Listed songs");
    Ok(Json(songs))
}

async fn list_artists(State(state): State<CatalogState>) -> ApiResult<Json<Vec<Artist>>> {
    let artists = state.artists.find_all().await?;
    tracing::debug!(count = artists.len(), "Listed artists");
    Ok(Json(artists))
}

/// Insert a song
///
/// The secret is checked before the body is read, so an unauthorized request
/// never writes and never reports body errors.
async fn create_song(
    State(state): State<CatalogState>,
    _auth: RequireUploadSecret,
    body: Bytes,
) -> ApiResult<Json<Created>> {
    let song: NewSong = serde_json::from_slice(&body)?;
    let insert = song.into_insert(chrono::Utc::now().year());

    let id = state.songs.insert(&insert).await?;
    tracing::info!(song_id = id, title = %insert.title, artist = %insert.artist, "Song created");

    Ok(Json(Created { success: true }))
}

/// Insert an artist
async fn create_artist(
    State(state): State<CatalogState>,
    _auth: RequireUploadSecret,
    body: Bytes,
) -> ApiResult<Json<Created>> {
    let artist: NewArtist = serde_json::from_slice(&body)?;

    let id = state.artists.insert(&artist).await?;
    tracing::info!(artist_id = id, name = %artist.name, "Artist created");

    Ok(Json(Created { success: true }))
}

async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method.to_string())
}
