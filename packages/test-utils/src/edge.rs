//! Mock edge API for testing the catalog client and the SEO proxy
//!
//! Provides a [`MockEdgeServer`] that answers the catalog list and insert
//! routes and the object upload route the way the real edge API does.

use dilshan_shared_config::UPLOAD_SECRET_HEADER;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Mock edge API server
///
/// Wraps a [`wiremock::MockServer`]. Mutating routes only match requests
/// carrying the configured upload secret.
///
/// # Example
///
/// ```rust,ignore
/// use dilshan_test_utils::{MockEdgeServer, SongFixture};
///
/// #[tokio::test]
/// async fn test_catalog_load() {
///     let edge = MockEdgeServer::start().await;
///     edge.mock_songs(vec![SongFixture::new(1, "Sanda Eliya", "Dilshan")]).await;
///     edge.mock_artists(vec![]).await;
///
///     // Configure your client with edge.url() and edge.secret()
/// }
/// ```
pub struct MockEdgeServer {
    server: MockServer,
    secret: String,
}

impl MockEdgeServer {
    /// Start a new mock edge API with the default secret
    pub async fn start() -> Self {
        Self::start_with_secret("test-upload-secret").await
    }

    /// Start a new mock edge API expecting `secret` on mutating calls
    pub async fn start_with_secret(secret: &str) -> Self {
        let server = MockServer::start().await;
        Self {
            server,
            secret: secret.to_string(),
        }
    }

    /// Get the server URL
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Get the accepted upload secret
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Access the underlying server, e.g. for `received_requests`
    pub fn inner(&self) -> &MockServer {
        &self.server
    }

    /// Mount `GET /api/songs` returning the fixtures in the given order
    pub async fn mock_songs(&self, songs: Vec<SongFixture>) {
        let body: Vec<Value> = songs.iter().map(SongFixture::to_json).collect();
        self.mock_list_json("/api/songs", json!(body)).await;
    }

    /// Mount `GET /api/artists` returning the fixtures in the given order
    pub async fn mock_artists(&self, artists: Vec<ArtistFixture>) {
        let body: Vec<Value> = artists.iter().map(ArtistFixture::to_json).collect();
        self.mock_list_json("/api/artists", json!(body)).await;
    }

    /// Mount a list route returning an arbitrary JSON body
    pub async fn mock_list_json(&self, list_path: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(list_path))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mount a list route that fails with the raw store message
    pub async fn mock_list_error(&self, list_path: &str, status: u16, message: &str) {
        Mock::given(method("GET"))
            .and(path(list_path))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": message,
                "code": "DATABASE_ERROR"
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount `POST /api/songs` and `POST /api/artists` accepting the secret
    pub async fn mock_inserts(&self) {
        Mock::given(method("POST"))
            .and(path_regex("^/api/(songs|artists)$"))
            .and(header(UPLOAD_SECRET_HEADER, self.secret.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .mount(&self.server)
            .await;
    }

    /// Mount a 401 for any mutating request carrying `bad_secret`
    ///
    /// Only matches the given secret, so mocks using the valid secret are
    /// unaffected.
    pub async fn mock_auth_failure(&self, bad_secret: &str) {
        Mock::given(header(UPLOAD_SECRET_HEADER, bad_secret))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "Unauthorized",
                "code": "UNAUTHORIZED"
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount `PUT /{key}` echoing back `{"url": "<server>/<key>"}`
    pub async fn mock_uploads(&self) {
        let base = self.url();
        Mock::given(method("PUT"))
            .and(path_regex("^/[^/]+$"))
            .and(header(UPLOAD_SECRET_HEADER, self.secret.as_str()))
            .respond_with(move |request: &Request| {
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "url": format!("{}{}", base, request.url.path()) }))
            })
            .mount(&self.server)
            .await;
    }

    /// Mount `GET /{key}` serving `body`
    pub async fn mock_object(&self, key: &str, body: &[u8], content_type: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/{}", key)))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", content_type)
                    .set_body_bytes(body.to_vec()),
            )
            .mount(&self.server)
            .await;
    }

    /// Requests received so far, in arrival order
    pub async fn received_requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }
}

/// Song row as the edge API serializes it
#[derive(Debug, Clone)]
pub struct SongFixture {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub artist_id: Option<String>,
    pub album: String,
    pub genre: String,
    pub year: String,
    pub description: String,
    pub album_art_url: String,
}

impl SongFixture {
    /// A song with the catalog defaults
    pub fn new(id: i64, title: &str, artist: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            artist: artist.to_string(),
            artist_id: None,
            album: String::new(),
            genre: "Pop".to_string(),
            year: "2024".to_string(),
            description: String::new(),
            album_art_url: format!("https://cdn.example.com/{}.png", id),
        }
    }

    pub fn with_artist_id(mut self, artist_id: &str) -> Self {
        self.artist_id = Some(artist_id.to_string());
        self
    }

    pub fn with_genre(mut self, genre: &str) -> Self {
        self.genre = genre.to_string();
        self
    }

    pub fn with_year(mut self, year: &str) -> Self {
        self.year = year.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Serialize with a numeric id, as the store returns it
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "title": self.title,
            "artist": self.artist,
            "artistId": self.artist_id,
            "album": self.album,
            "genre": self.genre,
            "year": self.year,
            "description": self.description,
            "lyrics": "",
            "bpm": 120,
            "key": "",
            "albumArtUrl": self.album_art_url,
            "downloadUrl": format!("https://cdn.example.com/{}.mp3", self.id),
            "youtubeUrl": ""
        })
    }
}

/// Artist row as the edge API serializes it
#[derive(Debug, Clone)]
pub struct ArtistFixture {
    pub id: i64,
    pub name: String,
    pub artist_type: String,
}

impl ArtistFixture {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            artist_type: "Singer".to_string(),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "type": self.artist_type,
            "imageUrl": "",
            "description": ""
        })
    }
}
