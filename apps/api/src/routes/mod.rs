//! HTTP routing for the edge API
//!
//! - Catalog endpoints under `/api/`
//! - Health check endpoints under `/health`
//! - Object storage for every other path
//!
//! [`build_router`] assembles the full service with its middleware stack and
//! is shared by the binary and the integration tests.

pub mod catalog;
pub mod health;
pub mod objects;

pub use catalog::{catalog_router, CatalogState};
pub use health::{health_router, HealthState};
pub use objects::{objects_router, ObjectsState};

use std::any::Any;
use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, response::IntoResponse, Extension, Router};
use sqlx::SqlitePool;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::config::{Config, DEFAULT_MAX_UPLOAD_BYTES};
use crate::error::ApiError;
use crate::middleware::{cors, UploadSecret};
use crate::repositories::{ArtistRepository, SongRepository};
use crate::storage::ObjectStore;

/// Everything the router needs from the outside world
#[derive(Clone)]
pub struct AppContext {
    pub pool: SqlitePool,
    pub object_store: Option<Arc<dyn ObjectStore>>,
    pub upload_secret: UploadSecret,
    pub public_base_url: Option<String>,
    pub max_upload_bytes: usize,
}

impl AppContext {
    pub fn new(pool: SqlitePool, upload_secret: impl Into<String>) -> Self {
        Self {
            pool,
            object_store: None,
            upload_secret: UploadSecret::new(upload_secret),
            public_base_url: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Build a context from loaded configuration
    pub fn from_config(
        config: &Config,
        pool: SqlitePool,
        object_store: Option<Arc<dyn ObjectStore>>,
    ) -> Self {
        Self {
            pool,
            object_store,
            upload_secret: UploadSecret::new(config.upload_secret.clone()),
            public_base_url: config.public_base_url.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Bind an object store
    pub fn with_object_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.object_store = Some(store);
        self
    }

    /// Use a fixed public origin for upload URLs
    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = Some(url.into());
        self
    }

    pub fn with_max_upload_bytes(mut self, limit: usize) -> Self {
        self.max_upload_bytes = limit;
        self
    }
}

/// Build the complete edge API router
pub fn build_router(ctx: AppContext) -> Router {
    let catalog_state = CatalogState::new(
        SongRepository::new(ctx.pool.clone()),
        ArtistRepository::new(ctx.pool.clone()),
    );
    let health_state = HealthState::new(ctx.pool.clone(), ctx.object_store.clone());
    let objects_state = ObjectsState::new(ctx.object_store, ctx.public_base_url);

    Router::new()
        .merge(catalog_router(catalog_state))
        .merge(health_router(health_state))
        // Object keys are the fallback and must come last
        .merge(objects_router(objects_state))
        .layer(Extension(ctx.upload_secret))
        .layer(DefaultBodyLimit::max(ctx.max_upload_bytes))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(cors))
}

/// Convert a handler panic into the standard JSON error response
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> axum::response::Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    ApiError::Internal(message).into_response()
}
