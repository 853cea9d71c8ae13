//! Object storage gateway
//!
//! Every path that is not a catalog or health route names an object:
//! - `GET /<key>` - public read
//! - `PUT /<key>` - upload, upload secret required
//!
//! Keys are the percent-decoded path without its leading `/`. Paths under
//! `/api/` are never object keys.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE, ETAG, HOST},
        HeaderMap, HeaderValue, Method, Uri,
    },
    response::{IntoResponse, Response},
    Extension, Json, Router,
};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::middleware::{verify_upload_secret, UploadSecret};
use crate::storage::{content_type_for_key, ObjectStore, DEFAULT_CONTENT_TYPE};

/// Shared state for object handlers
#[derive(Clone)]
pub struct ObjectsState {
    /// Bound object store; requests fail with 500 while unbound
    pub store: Option<Arc<dyn ObjectStore>>,
    /// Origin used in upload URLs; derived from the request when unset
    pub public_base_url: Option<String>,
}

impl ObjectsState {
    pub fn new(store: Option<Arc<dyn ObjectStore>>, public_base_url: Option<String>) -> Self {
        Self {
            store,
            public_base_url,
        }
    }

    fn store(&self) -> ApiResult<&Arc<dyn ObjectStore>> {
        self.store.as_ref().ok_or(ApiError::StorageNotConfigured)
    }
}

/// Body returned by a successful upload
#[derive(Debug, Serialize)]
pub struct Uploaded {
    pub url: String,
}

/// Create the object router
///
/// It only has a fallback, so it must be merged last into a router whose
/// other routes take precedence.
pub fn objects_router(state: ObjectsState) -> Router {
    Router::new().fallback(object_handler).with_state(state)
}

async fn object_handler(
    State(state): State<ObjectsState>,
    secret: Option<Extension<UploadSecret>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    let key = object_key_from_path(uri.path())?;

    match method {
        Method::GET => get_object(&state, &key).await,
        Method::PUT => {
            let Extension(secret) = secret
                .ok_or_else(|| ApiError::Internal("upload secret not configured".to_string()))?;
            verify_upload_secret(&headers, &secret)?;
            put_object(&state, &key, &headers, body).await
        }
        other => Err(ApiError::MethodNotAllowed(other.to_string())),
    }
}

/// Extract the object key from a request path
///
/// Empty keys and anything under `/api/` are not found.
pub fn object_key_from_path(path: &str) -> ApiResult<String> {
    if path.starts_with("/api/") {
        return Err(ApiError::not_found("route", path));
    }

    let raw = path.strip_prefix('/').unwrap_or(path);
    let key = urlencoding::decode(raw)
        .map_err(|e| ApiError::InvalidKey(e.to_string()))?
        .into_owned();

    if key.is_empty() {
        return Err(ApiError::not_found("route", path));
    }
    Ok(key)
}

async fn get_object(state: &ObjectsState, key: &str) -> ApiResult<Response> {
    let store = state.store()?;
    let object = store
        .get(key)
        .await?
        .ok_or_else(|| ApiError::not_found("object", key))?;

    let content_type = content_type_for_key(key)
        .map(str::to_string)
        .unwrap_or(object.meta.content_type);

    let mut response = Response::new(Body::from(object.body));
    let response_headers = response.headers_mut();
    response_headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_str(&content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE)),
    );
    response_headers.insert(CONTENT_LENGTH, HeaderValue::from(object.meta.size));
    if let Ok(etag) = HeaderValue::from_str(&object.meta.etag) {
        response_headers.insert(ETAG, etag);
    }

    tracing::debug!(key = %key, size = object.meta.size, "Object served");
    Ok(response)
}

async fn put_object(
    state: &ObjectsState,
    key: &str,
    headers: &HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    let store = state.store()?;
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_CONTENT_TYPE);

    let meta = store.put(key, body, content_type).await?;
    tracing::info!(
        key = %key,
        size = meta.size,
        content_type = %meta.content_type,
        backend = store.backend_name(),
        "Object uploaded"
    );

    let origin = match &state.public_base_url {
        Some(base) => base.clone(),
        None => request_origin(headers),
    };
    let url = format!("{}/{}", origin, encode_key(key));

    Ok(Json(Uploaded { url }).into_response())
}

/// Origin of the current request as seen by the caller
///
/// Honours `X-Forwarded-Proto` from a fronting proxy. Without a `Host`
/// header the origin is empty and the URL is root-relative.
fn request_origin(headers: &HeaderMap) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("http");

    match headers.get(HOST).and_then(|v| v.to_str().ok()) {
        Some(host) => format!("{}://{}", scheme, host),
        None => String::new(),
    }
}

/// Percent-encode a key for use in a URL, keeping `/` separators
fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
