//! Edge API client implementation

use std::fmt;

use bytes::{Bytes, BytesMut};
use dilshan_shared_config::{EdgeConfig, UPLOAD_SECRET_HEADER};
use futures_util::StreamExt;
use reqwest::{header::CONTENT_TYPE, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::error::{ClientError, ClientResult};
use crate::keys::object_key;
use crate::models::{Artist, NewArtist, NewSong, RawArtist, RawSong, Song};

/// Most bytes reserved up front for a download
const MAX_PREALLOCATION: u64 = 8 * 1024 * 1024;

/// Body returned by an object upload
#[derive(Debug, Deserialize)]
struct Uploaded {
    url: String,
}

/// Edge API client
///
/// Calls are made once: no timeouts and no retries.
#[derive(Clone)]
pub struct EdgeClient {
    http_client: Client,
    config: EdgeConfig,
}

impl fmt::Debug for EdgeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgeClient")
            .field("api_url", &self.config.api_url)
            .field(
                "upload_secret",
                &self.config.upload_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl EdgeClient {
    /// Create a client for the edge API described by `config`
    ///
    /// # Errors
    /// Returns `ClientError::InvalidUrl` if the base URL does not parse
    pub fn new(config: EdgeConfig) -> ClientResult<Self> {
        reqwest::Url::parse(&config.api_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", config.api_url, e)))?;

        let http_client = Client::builder().user_agent("DilshanMusic/1.0").build()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Base URL of the edge API
    pub fn base_url(&self) -> &str {
        &self.config.api_url
    }

    fn secret(&self) -> ClientResult<&str> {
        self.config
            .upload_secret
            .as_deref()
            .ok_or(ClientError::MissingSecret)
    }

    /// Map non-success statuses to errors
    async fn check_status(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Fetch a JSON array; anything other than an array reads as empty
    async fn fetch_list<T: DeserializeOwned>(&self, path: &str) -> ClientResult<Vec<T>> {
        let url = self.config.endpoint(path);
        let response = self.http_client.get(&url).send().await?;
        let text = Self::check_status(response).await?.text().await?;

        match serde_json::from_str::<serde_json::Value>(&text)? {
            value @ serde_json::Value::Array(_) => Ok(serde_json::from_value(value)?),
            _ => {
                warn!(path = %path, "Edge API returned a non-array list body");
                Ok(Vec::new())
            }
        }
    }

    /// Every song, newest first, normalized for display
    #[instrument(skip(self))]
    pub async fn list_songs(&self) -> ClientResult<Vec<Song>> {
        let raw: Vec<RawSong> = self.fetch_list("/api/songs").await?;
        let songs: Vec<Song> = raw.into_iter().map(Into::into).collect();
        debug!(count = songs.len(), "Fetched songs");
        Ok(songs)
    }

    /// Every artist, by name
    #[instrument(skip(self))]
    pub async fn list_artists(&self) -> ClientResult<Vec<Artist>> {
        let raw: Vec<RawArtist> = self.fetch_list("/api/artists").await?;
        let artists: Vec<Artist> = raw.into_iter().map(Into::into).collect();
        debug!(count = artists.len(), "Fetched artists");
        Ok(artists)
    }

    /// Insert a song
    ///
    /// # Errors
    /// - `ClientError::MissingSecret` if no upload secret is configured
    /// - `ClientError::Unauthorized` if the edge API rejects the secret
    #[instrument(skip(self, song), fields(title = %song.title))]
    pub async fn create_song(&self, song: &NewSong) -> ClientResult<()> {
        let secret = self.secret()?;
        let response = self
            .http_client
            .post(self.config.endpoint("/api/songs"))
            .header(UPLOAD_SECRET_HEADER, secret)
            .json(song)
            .send()
            .await?;
        Self::check_status(response).await?;
        debug!("Song created");
        Ok(())
    }

    /// Insert an artist
    #[instrument(skip(self, artist), fields(name = %artist.name))]
    pub async fn create_artist(&self, artist: &NewArtist) -> ClientResult<()> {
        let secret = self.secret()?;
        let response = self
            .http_client
            .post(self.config.endpoint("/api/artists"))
            .header(UPLOAD_SECRET_HEADER, secret)
            .json(artist)
            .send()
            .await?;
        Self::check_status(response).await?;
        debug!("Artist created");
        Ok(())
    }

    /// Upload a file under a fresh key and return its public URL
    #[instrument(skip(self, body))]
    pub async fn upload_object(
        &self,
        filename: &str,
        content_type: &str,
        body: impl Into<Bytes>,
    ) -> ClientResult<String> {
        let secret = self.secret()?;
        let key = object_key(filename);
        let body: Bytes = body.into();
        let size = body.len();

        let response = self
            .http_client
            .put(self.config.endpoint(&urlencoding::encode(&key)))
            .header(UPLOAD_SECRET_HEADER, secret)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;
        let text = Self::check_status(response).await?.text().await?;
        let uploaded: Uploaded = serde_json::from_str(&text)?;

        debug!(key = %key, size, url = %uploaded.url, "Object uploaded");
        Ok(uploaded.url)
    }

    /// Download `url` in chunks, reporting `(received, total)` after each one
    ///
    /// `total` is `None` when the server does not send a content length.
    #[instrument(skip(self, on_progress))]
    pub async fn download_with_progress<F>(&self, url: &str, mut on_progress: F) -> ClientResult<Bytes>
    where
        F: FnMut(u64, Option<u64>),
    {
        let response = self.http_client.get(url).send().await?;
        let response = Self::check_status(response).await?;
        let total = response.content_length();

        // Content-Length is untrusted; grow past the cap as bytes arrive
        let capacity = total.map_or(0, |t| t.min(MAX_PREALLOCATION)) as usize;
        let mut buffer = BytesMut::with_capacity(capacity);
        let mut received: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            received += chunk.len() as u64;
            buffer.extend_from_slice(&chunk);
            on_progress(received, total);
        }

        debug!(received, "Download complete");
        Ok(buffer.freeze())
    }
}
