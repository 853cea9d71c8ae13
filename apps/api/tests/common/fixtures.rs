//! Test fixtures for API integration tests
//!
//! Provides reusable catalog payloads.

#![allow(dead_code)]

use serde_json::{json, Value};

/// Upload secret used by every test app
pub const TEST_SECRET: &str = "test-upload-secret-0123";

/// Song payload with only the required fields
pub fn minimal_song(title: &str) -> Value {
    json!({
        "title": title,
        "artist": "Dilshan",
        "albumArtUrl": "https://edge.test/covers/a.jpg",
        "downloadUrl": "https://edge.test/audio/a.mp3"
    })
}

/// Song payload with every field filled in
pub fn full_song() -> Value {
    json!({
        "title": "Sanda Eliya",
        "artist": "Dilshan",
        "artistId": "1",
        "album": "Moonlight",
        "genre": "Ballad",
        "year": "2019",
        "description": "Lyrics and credits",
        "lyrics": "",
        "bpm": 88,
        "key": "Am",
        "albumArtUrl": "https://edge.test/covers/moon.jpg",
        "downloadUrl": "https://edge.test/audio/moon.mp3",
        "youtubeUrl": "abc123XYZ"
    })
}

/// Artist payload
pub fn artist(name: &str) -> Value {
    json!({
        "name": name,
        "type": "Pop Singer",
        "imageUrl": format!("https://edge.test/artists/{}.png", name)
    })
}
