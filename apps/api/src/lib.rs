//! Dilshan Music edge API
//!
//! Catalog endpoints backed by SQLite, an object storage gateway for audio
//! and artwork, and the shared-secret gate on every write. The router is
//! exposed here so integration tests can drive it in-process.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod storage;

// Re-export commonly used types
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::{build_router, AppContext};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Embedded catalog migrations
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Open the catalog pool and bring the schema up to date
///
/// An in-memory database lives only as long as its connection, so it is
/// pinned to a single connection that never idles out.
pub async fn connect_database(
    database: &dilshan_shared_config::DatabaseConfig,
) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&database.url)?.create_if_missing(true);

    let mut pool_options = SqlitePoolOptions::new()
        .acquire_timeout(Duration::from_secs(database.connect_timeout_secs));
    pool_options = if database.is_in_memory() {
        pool_options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        pool_options.max_connections(database.max_connections)
    };

    let pool = pool_options.connect_with(options).await?;
    MIGRATOR.run(&pool).await?;
    Ok(pool)
}
