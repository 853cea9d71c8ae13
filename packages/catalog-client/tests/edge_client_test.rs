//! Edge client tests against a mock edge API

use assert_matches::assert_matches;
use dilshan_catalog_client::{ClientError, EdgeClient, NewArtist, NewSong};
use dilshan_shared_config::EdgeConfig;
use dilshan_test_utils::{ArtistFixture, MockEdgeServer, SongFixture};
use rstest::rstest;
use serde_json::{json, Value};

fn client_for(edge: &MockEdgeServer) -> EdgeClient {
    EdgeClient::new(EdgeConfig::with_url(edge.url()).with_secret(edge.secret())).unwrap()
}

#[tokio::test]
async fn test_list_songs_stringifies_ids_and_keeps_order() {
    let edge = MockEdgeServer::start().await;
    edge.mock_songs(vec![
        SongFixture::new(7, "Newest", "Dilshan").with_artist_id("3"),
        SongFixture::new(2, "Older", "Kasun"),
    ])
    .await;

    let songs = client_for(&edge).list_songs().await.unwrap();

    assert_eq!(songs.len(), 2);
    assert_eq!(songs[0].id, "7");
    assert_eq!(songs[0].artist_id, "3");
    assert_eq!(songs[1].id, "2");
    assert_eq!(songs[1].artist_id, "");
}

#[tokio::test]
async fn test_list_songs_normalizes_missing_fields() {
    let edge = MockEdgeServer::start().await;
    edge.mock_list_json(
        "/api/songs",
        json!([{ "id": "abc", "title": "Bare", "artist": "Someone", "bpm": 0 }]),
    )
    .await;

    let songs = client_for(&edge).list_songs().await.unwrap();
    let song = &songs[0];

    assert_eq!(song.id, "abc");
    assert_eq!(song.genre, "Pop");
    assert_eq!(song.bpm, 120);
    assert_eq!(song.year, "");
    assert_eq!(song.album, "");
    assert_eq!(song.key, "");
}

#[rstest]
#[case::object(json!({ "songs": [] }))]
#[case::null(Value::Null)]
#[case::string(json!("nope"))]
#[tokio::test]
async fn test_non_array_list_reads_as_empty(#[case] body: Value) {
    let edge = MockEdgeServer::start().await;
    edge.mock_list_json("/api/artists", body).await;

    let artists = client_for(&edge).list_artists().await.unwrap();
    assert!(artists.is_empty());
}

#[tokio::test]
async fn test_list_error_carries_store_message() {
    let edge = MockEdgeServer::start().await;
    edge.mock_list_error("/api/songs", 500, "no such table: songs")
        .await;

    let err = client_for(&edge).list_songs().await.unwrap_err();
    assert_matches!(err, ClientError::Status { status: 500, ref body } if body.contains("no such table"));
}

#[tokio::test]
async fn test_list_artists() {
    let edge = MockEdgeServer::start().await;
    edge.mock_artists(vec![ArtistFixture::new(1, "Dilshan")]).await;

    let artists = client_for(&edge).list_artists().await.unwrap();
    assert_eq!(artists[0].id, "1");
    assert_eq!(artists[0].artist_type, "Singer");
}

#[tokio::test]
async fn test_create_song_sends_secret_and_camel_case_body() {
    let edge = MockEdgeServer::start().await;
    edge.mock_inserts().await;

    let song = NewSong {
        title: "Sanda Eliya".into(),
        artist: "Dilshan".into(),
        artist_id: Some("3".into()),
        album_art_url: "https://cdn.example.com/a.png".into(),
        download_url: "https://cdn.example.com/a.mp3".into(),
        ..Default::default()
    };
    client_for(&edge).create_song(&song).await.unwrap();

    let requests = edge.received_requests().await;
    assert_eq!(requests.len(), 1);
    // The insert mock only matches the configured secret
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["artistId"], "3");
    assert_eq!(body["albumArtUrl"], "https://cdn.example.com/a.png");
    assert!(body.get("year").is_none());
}

#[tokio::test]
async fn test_rejected_secret_is_unauthorized() {
    let edge = MockEdgeServer::start().await;
    edge.mock_auth_failure("wrong-secret").await;

    let client =
        EdgeClient::new(EdgeConfig::with_url(edge.url()).with_secret("wrong-secret")).unwrap();
    let result = client
        .create_artist(&NewArtist {
            name: "Dilshan".into(),
            artist_type: "Singer".into(),
            ..Default::default()
        })
        .await;

    assert_matches!(result, Err(ClientError::Unauthorized));
}

#[tokio::test]
async fn test_upload_object_uses_fresh_sanitized_key() {
    let edge = MockEdgeServer::start().await;
    edge.mock_uploads().await;

    let client = client_for(&edge);
    let first = client
        .upload_object("My Song.mp3", "audio/mpeg", b"one".to_vec())
        .await
        .unwrap();
    let second = client
        .upload_object("My Song.mp3", "audio/mpeg", b"two".to_vec())
        .await
        .unwrap();

    assert!(first.starts_with(&edge.url()));
    assert!(first.ends_with("-My-Song.mp3"));
    assert_ne!(first, second);

    let requests = edge.received_requests().await;
    assert_eq!(requests[0].body, b"one");
}

#[tokio::test]
async fn test_download_reports_progress() {
    let edge = MockEdgeServer::start().await;
    let payload = vec![7u8; 64 * 1024];
    edge.mock_object("track.mp3", &payload, "audio/mpeg").await;

    let mut reports = Vec::new();
    let bytes = client_for(&edge)
        .download_with_progress(&format!("{}/track.mp3", edge.url()), |received, total| {
            reports.push((received, total))
        })
        .await
        .unwrap();

    assert_eq!(bytes.len(), payload.len());
    let (last_received, last_total) = *reports.last().unwrap();
    assert_eq!(last_received, payload.len() as u64);
    assert_eq!(last_total, Some(payload.len() as u64));
    assert!(reports.windows(2).all(|w| w[0].0 <= w[1].0));
}

#[tokio::test]
async fn test_download_missing_object_is_status_error() {
    let edge = MockEdgeServer::start().await;

    let result = client_for(&edge)
        .download_with_progress(&format!("{}/missing.mp3", edge.url()), |_, _| {})
        .await;

    assert_matches!(result, Err(ClientError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_download_with_oversized_content_length_fails_cleanly() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // Claims an absurd length, sends three bytes, then hangs up
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await;
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 4000000000000000000\r\n\r\nabc")
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });

    let edge = MockEdgeServer::start().await;
    let mut reports = Vec::new();
    let result = client_for(&edge)
        .download_with_progress(&format!("http://{}/huge.bin", addr), |received, total| {
            reports.push((received, total))
        })
        .await;

    assert_matches!(result, Err(ClientError::Http(_)));
    assert!(reports
        .iter()
        .all(|(_, total)| *total == Some(4_000_000_000_000_000_000)));
    if let Some((received, _)) = reports.last() {
        assert_eq!(*received, 3);
    }
}
