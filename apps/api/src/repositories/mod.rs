//! Catalog store gateway
//!
//! All SQL lives here. Handlers go through the repositories and never build
//! queries themselves.

pub mod artist;
pub mod song;
pub mod utils;

pub use artist::ArtistRepository;
pub use song::SongRepository;
