//! Shared test utilities for the Dilshan Music workspace
//!
//! Mock HTTP servers standing in for the edge API and the SPA origin, so the
//! catalog client and the SEO proxy can be tested without the real services.
//!
//! # Mock Services
//!
//! - [`MockEdgeServer`] - Edge API: catalog lists, inserts and uploads
//! - [`MockOriginServer`] - Static site origin serving the SPA shell
//!
//! # Example
//!
//! ```rust,ignore
//! use dilshan_test_utils::{MockEdgeServer, SongFixture};
//!
//! #[tokio::test]
//! async fn test_with_mocks() {
//!     let edge = MockEdgeServer::start().await;
//!     edge.mock_songs(vec![SongFixture::new(1, "Sanda Eliya", "Dilshan")]).await;
//!
//!     // Point the client at edge.url()
//! }
//! ```

mod edge;
mod origin;

pub use edge::{ArtistFixture, MockEdgeServer, SongFixture};
pub use origin::{MockOriginServer, SPA_SHELL};
