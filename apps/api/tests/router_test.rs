//! Integration tests for request dispatch and the middleware stack

mod common;

use axum::{body::Body, http::Request, http::StatusCode};
use common::*;
use rstest::rstest;

#[rstest]
#[case("/api/songs")]
#[case("/api/unknown")]
#[case("/some/object.mp3")]
#[tokio::test]
async fn test_options_short_circuits_everywhere(#[case] uri: &str) {
    let app = TestApp::new().await;

    let response = app
        .send(
            Request::builder()
                .method("OPTIONS")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    assert!(body_bytes(response).await.is_empty());
}

#[rstest]
#[case("/api/")]
#[case("/api/unknown")]
#[case("/api/songs/1")]
#[case("/")]
#[tokio::test]
async fn test_non_object_paths_are_not_found(#[case] uri: &str) {
    let app = TestApp::new().await;

    let response = app.send(get(uri)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_cors(&response);
}

#[rstest]
#[case("DELETE", "/song.mp3")]
#[case("POST", "/song.mp3")]
#[case("PATCH", "/cover.png")]
#[tokio::test]
async fn test_other_methods_on_objects_not_allowed(#[case] method: &str, #[case] uri: &str) {
    let app = TestApp::new().await;

    let response = app
        .send(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_cors(&response);
    assert_eq!(body_json(response).await["code"], "METHOD_NOT_ALLOWED");
}

#[tokio::test]
async fn test_unsupported_method_on_catalog_route() {
    let app = TestApp::new().await;

    let response = app
        .send(
            Request::builder()
                .method("PUT")
                .uri("/api/songs")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_cors_on_every_response() {
    let app = TestApp::new().await;

    assert_cors(&app.send(get("/api/songs")).await);
    assert_cors(&app.send(get("/missing.png")).await);
    assert_cors(&app.send(get("/health")).await);
}
