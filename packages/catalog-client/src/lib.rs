//! Client side of the Dilshan Music catalog
//!
//! This crate provides:
//! - [`EdgeClient`]: HTTP client for the edge API (catalog reads and inserts,
//!   object uploads, downloads with progress)
//! - [`CatalogCache`]: in-memory copy of the whole catalog with a
//!   subscribable `Idle -> Loading -> Ready | Error` status
//! - [`IdentityCache`]: the signed-in user's profile, mirrored from a
//!   [`ProfileStore`], with profile edits and like toggles
//!
//! # Example
//!
//! ```rust,no_run
//! use dilshan_catalog_client::{CatalogCache, EdgeClient};
//! use dilshan_shared_config::EdgeConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = EdgeClient::new(EdgeConfig::from_env()?)?;
//! let catalog = CatalogCache::new(client);
//!
//! catalog.load().await?;
//! for song in catalog.snapshot().search("sanda") {
//!     println!("{} - {}", song.title, song.artist);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Environment Variables
//!
//! - `EDGE_API_URL`: base URL of the edge API (default `http://localhost:8787`)
//! - `UPLOAD_SECRET`: shared secret, only needed for inserts and uploads

mod catalog;
mod client;
mod error;
mod identity;
pub mod keys;
mod models;
pub mod slug;

pub use catalog::{CatalogCache, CatalogSnapshot, CatalogStatus};
pub use client::EdgeClient;
pub use error::{ClientError, ClientResult};
pub use identity::{IdentityCache, IdentityState, MemoryProfileStore, ProfileStore};
pub use models::{
    Album, Artist, ArtistWithSongCount, Gender, GenreCount, NewArtist, NewSong, ProfileUpdate,
    Role, Session, Song, UserProfile, YearGroup,
};
