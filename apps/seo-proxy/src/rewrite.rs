//! Song page metadata injection
//!
//! The origin serves the same SPA shell for every route, so crawlers see the
//! site-wide title everywhere. For song pages the shell's title is replaced
//! with a block of song-specific title, description, Open Graph and Twitter
//! card tags.

use dilshan_catalog_client::Song;
use regex::Regex;

/// Metadata injected into one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub image: String,
    /// Absolute URL of the page being served
    pub url: String,
}

impl PageMeta {
    /// Metadata for a song page
    ///
    /// The description falls back to a generic blurb when the song has none.
    pub fn for_song(song: &Song, site_name: &str, page_url: &str) -> Self {
        let description = if song.description.is_empty() {
            format!("Stream and download {} on {}.", song.title, site_name)
        } else {
            song.description.clone()
        };

        Self {
            title: format!("{} - {} | {}", song.title, song.artist, site_name),
            description,
            image: song.album_art_url.clone(),
            url: page_url.to_string(),
        }
    }

    /// Render the tag block, escaping every value
    pub fn to_tags(&self) -> String {
        let title = escape_html(&self.title);
        let description = escape_html(&self.description);
        let image = escape_html(&self.image);
        let url = escape_html(&self.url);

        format!(
            r#"
    <title>{title}</title>
    <meta name="description" content="{description}">
    <meta property="og:title" content="{title}">
    <meta property="og:description" content="{description}">
    <meta property="og:image" content="{image}">
    <meta property="og:url" content="{url}">
    <meta property="og:type" content="music.song">
    <meta name="twitter:card" content="summary_large_image">
    <meta name="twitter:title" content="{title}">
    <meta name="twitter:description" content="{description}">
    <meta name="twitter:image" content="{image}">
"#
        )
    }
}

/// Rewrites HTML documents with injected metadata
#[derive(Debug, Clone)]
pub struct HtmlRewriter {
    title: Regex,
}

impl HtmlRewriter {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            // `.` stops at newlines, so only a single-line title matches
            title: Regex::new(r"<title>.*?</title>")?,
        })
    }

    /// Drop the first single-line `<title>` and insert `meta` after the
    /// first `<head>`
    ///
    /// A document without `<head>` only loses its title.
    pub fn inject(&self, html: &str, meta: &PageMeta) -> String {
        let without_title = self.title.replacen(html, 1, "");
        match without_title.find("<head>") {
            Some(pos) => {
                let insert_at = pos + "<head>".len();
                let tags = meta.to_tags();
                let mut out = String::with_capacity(without_title.len() + tags.len());
                out.push_str(&without_title[..insert_at]);
                out.push_str(&tags);
                out.push_str(&without_title[insert_at..]);
                out
            }
            None => without_title.into_owned(),
        }
    }
}

/// Escape text for use inside an HTML attribute or element
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
