//! Shared SQL fragments for the catalog repositories

// ============================================================================
// SQL Column Constants
//
// SELECT column lists, kept in the same order as the model fields.
// ============================================================================

/// SQL columns for song queries
pub const SONG_COLUMNS: &str = r#"
    id, title, artist, artist_id, album, genre, year,
    description, lyrics, bpm, song_key,
    album_art_url, download_url, youtube_url
"#;

/// SQL columns for artist queries
pub const ARTIST_COLUMNS: &str = r#"
    id, name, artist_type, image_url, description
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn column_names(columns: &str) -> Vec<&str> {
        columns
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect()
    }

    #[test]
    fn test_song_columns() {
        let cols = column_names(SONG_COLUMNS);
        assert_eq!(cols.len(), 14);
        assert_eq!(cols[0], "id");
        assert!(cols.contains(&"song_key"));
        assert!(!cols.contains(&"key"));
    }

    #[test]
    fn test_artist_columns() {
        let cols = column_names(ARTIST_COLUMNS);
        assert_eq!(
            cols,
            vec!["id", "name", "artist_type", "image_url", "description"]
        );
    }
}
