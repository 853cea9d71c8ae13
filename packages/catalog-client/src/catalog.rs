//! Client-side catalog cache
//!
//! Holds the whole catalog in memory. Every load replaces both lists with a
//! fresh fetch; there is no merging and no local mutation. Inserts go to the
//! edge API first and are followed by a full refresh, so the cache only ever
//! shows what the store returned.
//!
//! Subscribers receive a [`CatalogSnapshot`] on every transition. Dropping a
//! receiver unsubscribes it.

use std::collections::HashMap;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::client::EdgeClient;
use crate::error::ClientResult;
use crate::models::{
    Album, Artist, ArtistWithSongCount, GenreCount, NewArtist, NewSong, Song, UserProfile,
    YearGroup,
};
use crate::slug::slugify;

/// Genre label used for songs with an empty genre
const UNGROUPED_GENRE: &str = "General";

/// Year label used for songs with an empty year
const UNGROUPED_YEAR: &str = "Legacy";

/// Load status of the cache
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CatalogStatus {
    /// Nothing fetched yet
    #[default]
    Idle,
    Loading,
    Ready,
    /// Last fetch failed; lists hold the previous successful fetch
    Error(String),
}

/// Point-in-time view of the cache
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    pub status: CatalogStatus,
    pub songs: Vec<Song>,
    pub artists: Vec<Artist>,
}

/// Shared in-memory catalog
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct CatalogCache {
    client: EdgeClient,
    state: watch::Sender<CatalogSnapshot>,
}

impl CatalogCache {
    pub fn new(client: EdgeClient) -> Self {
        let (state, _) = watch::channel(CatalogSnapshot::default());
        Self { client, state }
    }

    /// Receive a snapshot on every status change
    pub fn subscribe(&self) -> watch::Receiver<CatalogSnapshot> {
        self.state.subscribe()
    }

    /// Current snapshot
    pub fn snapshot(&self) -> CatalogSnapshot {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> CatalogStatus {
        self.state.borrow().status.clone()
    }

    /// Initial load; identical to [`refresh`](Self::refresh)
    pub async fn load(&self) -> ClientResult<()> {
        self.refresh().await
    }

    /// Fetch songs and artists concurrently and replace both lists
    ///
    /// Both fetches must succeed. On failure the status becomes `Error` with
    /// the first failure message and the previous lists stay in place.
    pub async fn refresh(&self) -> ClientResult<()> {
        self.state
            .send_modify(|snapshot| snapshot.status = CatalogStatus::Loading);

        let result = tokio::try_join!(self.client.list_songs(), self.client.list_artists());

        match result {
            Ok((songs, artists)) => {
                debug!(
                    songs = songs.len(),
                    artists = artists.len(),
                    "Catalog refreshed"
                );
                self.state.send_replace(CatalogSnapshot {
                    status: CatalogStatus::Ready,
                    songs,
                    artists,
                });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Catalog refresh failed");
                let message = e.to_string();
                self.state
                    .send_modify(|snapshot| snapshot.status = CatalogStatus::Error(message));
                Err(e)
            }
        }
    }

    /// Insert a song, then refresh
    ///
    /// A failed insert does not refresh. A failed refresh after a successful
    /// insert returns the refresh error.
    pub async fn add_song(&self, song: &NewSong) -> ClientResult<()> {
        self.client.create_song(song).await?;
        self.refresh().await
    }

    /// Insert an artist, then refresh
    pub async fn add_artist(&self, artist: &NewArtist) -> ClientResult<()> {
        self.client.create_artist(artist).await?;
        self.refresh().await
    }
}

impl CatalogSnapshot {
    pub fn is_ready(&self) -> bool {
        self.status == CatalogStatus::Ready
    }

    /// Songs whose title, artist or genre contains `query`, ignoring case
    ///
    /// An empty query matches every song.
    pub fn search(&self, query: &str) -> Vec<&Song> {
        let needle = query.trim().to_lowercase();
        self.songs
            .iter()
            .filter(|song| {
                needle.is_empty()
                    || song.title.to_lowercase().contains(&needle)
                    || song.artist.to_lowercase().contains(&needle)
                    || song.genre.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Distinct genres in first-seen order with their song counts
    pub fn genres(&self) -> Vec<GenreCount> {
        let mut order: Vec<GenreCount> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for song in &self.songs {
            let genre = if song.genre.is_empty() {
                UNGROUPED_GENRE
            } else {
                song.genre.as_str()
            };
            match index.get(genre) {
                Some(&i) => order[i].count += 1,
                None => {
                    index.insert(genre, order.len());
                    order.push(GenreCount {
                        genre: genre.to_string(),
                        count: 1,
                    });
                }
            }
        }
        order
    }

    /// Songs credited to `artist`, by id link or by display name
    pub fn songs_by_artist(&self, artist: &Artist) -> Vec<&Song> {
        self.songs
            .iter()
            .filter(|song| credits(song, artist))
            .collect()
    }

    /// Every artist with the number of songs credited to them
    pub fn artists_with_song_count(&self) -> Vec<ArtistWithSongCount> {
        self.artists
            .iter()
            .map(|artist| ArtistWithSongCount {
                artist: artist.clone(),
                song_count: self.songs.iter().filter(|s| credits(s, artist)).count(),
            })
            .collect()
    }

    /// Songs grouped by album name, first-seen order; blank albums skipped
    pub fn albums(&self) -> Vec<Album> {
        let mut albums: Vec<Album> = Vec::new();
        for song in &self.songs {
            let name = song.album.trim();
            if name.is_empty() {
                continue;
            }
            match albums.iter_mut().find(|a| a.name == name) {
                Some(album) => album.songs.push(song.clone()),
                None => albums.push(Album {
                    name: name.to_string(),
                    songs: vec![song.clone()],
                }),
            }
        }
        albums
    }

    /// Songs grouped by year, latest year first
    ///
    /// Blank years are grouped as "Legacy". Years compare as text.
    pub fn songs_by_year(&self) -> Vec<YearGroup> {
        let mut groups: Vec<YearGroup> = Vec::new();
        for song in &self.songs {
            let year = if song.year.is_empty() {
                UNGROUPED_YEAR
            } else {
                song.year.as_str()
            };
            match groups.iter_mut().find(|g| g.year == year) {
                Some(group) => group.songs.push(song.clone()),
                None => groups.push(YearGroup {
                    year: year.to_string(),
                    songs: vec![song.clone()],
                }),
            }
        }
        groups.sort_by(|a, b| b.year.cmp(&a.year));
        groups
    }

    /// First song whose title slug or id equals `slug_or_id`
    pub fn find_song(&self, slug_or_id: &str) -> Option<&Song> {
        self.songs
            .iter()
            .find(|song| slugify(&song.title) == slug_or_id || song.id == slug_or_id)
    }

    /// Catalog songs the user has liked, in catalog order
    ///
    /// Liked ids that are no longer in the catalog are skipped.
    pub fn liked_songs(&self, profile: &UserProfile) -> Vec<&Song> {
        self.songs
            .iter()
            .filter(|song| profile.has_liked(&song.id))
            .collect()
    }
}

fn credits(song: &Song, artist: &Artist) -> bool {
    (!song.artist_id.is_empty() && song.artist_id == artist.id) || song.artist == artist.name
}
