//! Request forwarding
//!
//! Every request is forwarded to the origin. Successful song pages get
//! their metadata injected; everything else passes through untouched.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, Response, StatusCode, Uri},
    Router,
};
use dilshan_catalog_client::{slug::slugify, EdgeClient, Song};
use tracing::{debug, instrument, warn};

use crate::error::{ProxyError, ProxyResult};
use crate::rewrite::{HtmlRewriter, PageMeta};

/// Path prefix of song pages
pub const SONG_PATH_PREFIX: &str = "/song/";

/// Request headers never forwarded to the origin
///
/// Hop-by-hop headers belong to the client connection, and the body length
/// is recomputed by the origin client from the buffered body.
const STRIPPED_REQUEST_HEADERS: [&str; 10] = [
    "host",
    "accept-encoding",
    "content-length",
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Response headers that describe the origin connection, not the body
const STRIPPED_RESPONSE_HEADERS: [&str; 2] = ["connection", "transfer-encoding"];

/// Shared proxy state
#[derive(Clone)]
pub struct ProxyState {
    inner: Arc<ProxyInner>,
}

struct ProxyInner {
    http_client: reqwest::Client,
    origin_url: String,
    site_name: String,
    catalog: EdgeClient,
    rewriter: HtmlRewriter,
}

impl ProxyState {
    pub fn new(
        origin_url: impl Into<String>,
        site_name: impl Into<String>,
        catalog: EdgeClient,
    ) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            inner: Arc::new(ProxyInner {
                http_client,
                origin_url: origin_url.into().trim_end_matches('/').to_string(),
                site_name: site_name.into(),
                catalog,
                rewriter: HtmlRewriter::new()?,
            }),
        })
    }
}

/// Router that forwards every path
pub fn proxy_router(state: ProxyState) -> Router {
    Router::new().fallback(proxy_handler).with_state(state)
}

#[instrument(skip_all, fields(method = %method, path = %uri.path()))]
async fn proxy_handler(
    State(state): State<ProxyState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> ProxyResult<Response<Body>> {
    let origin = forward(&state.inner, &method, &uri, &headers, body).await?;

    if uri.path().starts_with(SONG_PATH_PREFIX) && origin.status.is_success() {
        let page_url = request_url(&headers, &uri);
        if let Some(html) = rewrite_song_page(&state.inner, &uri, &page_url, &origin.body).await {
            debug!("Injected song metadata");
            return Ok(origin.into_response(Some(Bytes::from(html))));
        }
    }

    Ok(origin.into_response(None))
}

/// Origin response, fully buffered
struct OriginResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl OriginResponse {
    /// Rebuild the response, replacing the body and its length if rewritten
    fn into_response(self, rewritten: Option<Bytes>) -> Response<Body> {
        let mut headers = self.headers;
        let body = match rewritten {
            Some(html) => {
                headers.insert(header::CONTENT_LENGTH, HeaderValue::from(html.len()));
                html
            }
            None => self.body,
        };

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = self.status;
        *response.headers_mut() = headers;
        response
    }
}

/// Send the request to `<origin><path><query>` and buffer the answer
async fn forward(
    inner: &ProxyInner,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: Bytes,
) -> ProxyResult<OriginResponse> {
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let target = format!("{}{}", inner.origin_url, path_and_query);

    let method = reqwest::Method::from_bytes(method.as_str().as_bytes())
        .map_err(|e| ProxyError::BadRequest(e.to_string()))?;

    let mut request = inner.http_client.request(method, &target);
    for (name, value) in headers {
        if is_forwarded_request_header(name) {
            request = request.header(name.as_str(), value.as_bytes());
        }
    }
    if !body.is_empty() {
        request = request.body(body);
    }

    let response = request.send().await?;

    // reqwest and axum sit on different `http` versions
    let status = StatusCode::from_u16(response.status().as_u16())
        .unwrap_or(StatusCode::BAD_GATEWAY);
    let mut out_headers = HeaderMap::new();
    for (name, value) in response.headers() {
        if STRIPPED_RESPONSE_HEADERS.contains(&name.as_str()) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_str().as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            out_headers.append(name, value);
        }
    }
    let body = response.bytes().await?;

    debug!(target = %target, status = status.as_u16(), "Origin responded");
    Ok(OriginResponse {
        status,
        headers: out_headers,
        body,
    })
}

fn is_forwarded_request_header(name: &HeaderName) -> bool {
    !STRIPPED_REQUEST_HEADERS.contains(&name.as_str())
}

/// Rewritten HTML for a song page, or `None` to serve the origin as is
async fn rewrite_song_page(
    inner: &ProxyInner,
    uri: &Uri,
    page_url: &str,
    body: &Bytes,
) -> Option<String> {
    let segment = uri.path().rsplit('/').next().unwrap_or_default();

    let songs = match inner.catalog.list_songs().await {
        Ok(songs) => songs,
        Err(e) => {
            warn!(error = %e, "Song lookup failed, serving page unmodified");
            return None;
        }
    };

    let Some(song) = find_song(&songs, segment) else {
        debug!(segment = %segment, "No song matches page");
        return None;
    };

    let html = match std::str::from_utf8(body) {
        Ok(html) => html,
        Err(e) => {
            warn!(error = %e, "Origin page is not UTF-8, serving page unmodified");
            return None;
        }
    };

    let meta = PageMeta::for_song(song, &inner.site_name, page_url);
    Some(inner.rewriter.inject(html, &meta))
}

fn find_song<'a>(songs: &'a [Song], segment: &str) -> Option<&'a Song> {
    songs
        .iter()
        .find(|song| slugify(&song.title) == segment || song.id == segment)
}

/// Absolute URL of the incoming request
fn request_url(headers: &HeaderMap, uri: &Uri) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    format!("{}://{}{}", scheme, host, path_and_query)
}
