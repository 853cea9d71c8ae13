//! Dilshan Music SEO proxy
//!
//! Sits in front of the static site origin. Song pages (`/song/<slug>`)
//! have the SPA shell's generic title swapped for song-specific title,
//! description, Open Graph and Twitter card tags so link previews and
//! crawlers see the song. Lookup failures fall back to the origin response.

pub mod config;
pub mod error;
pub mod proxy;
pub mod rewrite;

pub use error::{ProxyError, ProxyResult};
pub use proxy::{proxy_router, ProxyState};

use axum::Router;
use tower_http::trace::TraceLayer;

/// Build the complete proxy service
pub fn build_router(state: ProxyState) -> Router {
    proxy_router(state).layer(TraceLayer::new_for_http())
}
