//! Test helper functions for API integration tests
//!
//! Provides an in-process app over in-memory SQLite and the memory object
//! store, plus request and response helpers for `oneshot` calls.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use dilshan_api::storage::MemoryObjectStore;
use dilshan_api::{build_router, connect_database, AppContext};
use dilshan_shared_config::{DatabaseConfig, UPLOAD_SECRET_HEADER};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

use super::fixtures::TEST_SECRET;

/// Fresh in-memory catalog with migrations applied
pub async fn test_pool() -> SqlitePool {
    connect_database(&DatabaseConfig::with_url("sqlite::memory:"))
        .await
        .expect("in-memory database should open")
}

/// Test app with its backing stores exposed for assertions
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub store: MemoryObjectStore,
}

impl TestApp {
    /// App with an in-memory object store bound
    pub async fn new() -> Self {
        Self::with(|ctx| ctx).await
    }

    /// App with no object store bound
    pub async fn without_object_store() -> Self {
        let pool = test_pool().await;
        let router = build_router(AppContext::new(pool.clone(), TEST_SECRET));
        Self {
            router,
            pool,
            store: MemoryObjectStore::new(),
        }
    }

    /// App with an in-memory object store and a customised context
    pub async fn with(customise: impl FnOnce(AppContext) -> AppContext) -> Self {
        let pool = test_pool().await;
        let store = MemoryObjectStore::new();
        let ctx = AppContext::new(pool.clone(), TEST_SECRET)
            .with_object_store(Arc::new(store.clone()));
        let router = build_router(customise(ctx));
        Self {
            router,
            pool,
            store,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// POST a JSON body, optionally with the upload secret
pub fn post_json(uri: &str, body: &Value, secret: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(secret) = secret {
        builder = builder.header(UPLOAD_SECRET_HEADER, secret);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// POST raw bytes with the valid secret
pub fn post_raw(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header(UPLOAD_SECRET_HEADER, TEST_SECRET)
        .body(Body::from(body))
        .unwrap()
}

/// PUT an object, optionally with the upload secret
pub fn put_object(
    uri: &str,
    body: &'static [u8],
    content_type: Option<&str>,
    secret: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method("PUT")
        .uri(uri)
        .header("host", "edge.test");
    if let Some(ct) = content_type {
        builder = builder.header("content-type", ct);
    }
    if let Some(secret) = secret {
        builder = builder.header(UPLOAD_SECRET_HEADER, secret);
    }
    builder.body(Body::from(body)).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

/// Assert that a response carries the permissive CORS header set
pub fn assert_cors(response: &Response<Body>) {
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(
        headers["access-control-allow-methods"],
        "GET, POST, PUT, OPTIONS"
    );
    assert_eq!(
        headers["access-control-allow-headers"],
        "Content-Type, X-Custom-Auth-Key"
    );
    assert_eq!(headers["access-control-max-age"], "86400");
}
