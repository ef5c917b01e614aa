//! Heading anchor slugs for the hosted markdown dialects.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters Azure DevOps leaves encoded in heading anchors.
const AZURE_ANCHOR: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// GitHub heading anchor slug.
///
/// - trim surrounding whitespace
/// - lowercase
/// - remove all chars that aren't alphanumeric, whitespace or hyphen
/// - every whitespace char becomes one hyphen (runs are not collapsed)
pub fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().to_lowercase().chars() {
        if c.is_alphanumeric() || c == '-' {
            slug.push(c);
        } else if c.is_whitespace() {
            slug.push('-');
        }
        // Everything else, underscores included, is stripped
    }
    slug
}

/// GitLab heading anchor slug: like GitHub, but underscores survive and
/// consecutive hyphens collapse into one.
pub fn gitlab_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().to_lowercase().chars() {
        let c = if c.is_whitespace() { '-' } else { c };
        if c == '-' {
            if !slug.ends_with('-') {
                slug.push('-');
            }
        } else if c.is_alphanumeric() || c == '_' {
            slug.push(c);
        }
    }
    slug
}

/// Azure DevOps heading anchor slug: lowercase, whitespace to hyphens,
/// reserved characters percent-encoded.
pub fn azure_slug(text: &str) -> String {
    let lowered: String = text
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect();
    utf8_percent_encode(&lowered, AZURE_ANCHOR).to_string()
}
