//! Common test utilities for proxy integration tests
//!
//! Wires a proxy to a mock origin and a mock edge API and drives it
//! in-process with `oneshot`.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use dilshan_catalog_client::EdgeClient;
use dilshan_seo_proxy::{build_router, ProxyState};
use dilshan_shared_config::EdgeConfig;
use dilshan_test_utils::{MockEdgeServer, MockOriginServer};
use tower::ServiceExt;

/// Host the proxy pretends to be served on
pub const PUBLIC_HOST: &str = "music.example.com";

pub struct TestProxy {
    pub router: Router,
    pub origin: MockOriginServer,
    pub edge: MockEdgeServer,
}

impl TestProxy {
    pub async fn start() -> Self {
        let origin = MockOriginServer::start().await;
        let edge = MockEdgeServer::start().await;
        let router = router_for(&origin.url(), &edge.url());
        Self {
            router,
            origin,
            edge,
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

pub fn router_for(origin_url: &str, edge_url: &str) -> Router {
    let catalog = EdgeClient::new(EdgeConfig::with_url(edge_url)).expect("valid edge URL");
    let state = ProxyState::new(origin_url, "Dilshan Music", catalog).expect("proxy state");
    build_router(state)
}

/// GET as a browser would send it through the public host
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("host", PUBLIC_HOST)
        .header("x-forwarded-proto", "https")
        .header("accept-encoding", "gzip, br")
        .body(Body::empty())
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}
