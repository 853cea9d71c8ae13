//! URL slugs for song pages

/// Slug for a title, as used in `/song/<slug>` paths
///
/// Lowercases and trims, drops everything except ASCII letters, digits,
/// `_` and spaces, then turns each run of spaces into a single `-`.
pub fn slugify(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == ' ')
        .collect();

    let mut slug = String::with_capacity(kept.len());
    let mut in_spaces = false;
    for c in kept.chars() {
        if c == ' ' {
            if !in_spaces {
                slug.push('-');
            }
            in_spaces = true;
        } else {
            slug.push(c);
            in_spaces = false;
        }
    }
    slug
}
