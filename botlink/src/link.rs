//! Share link construction and token extraction.
//!
//! The share token is URL-safe by construction, so the link layer is plain
//! string work: append the token under the `data` query parameter, and pull
//! it back out of a query string without any percent decoding.

use bcodec::{Persona, encode_share_token};

/// Query parameter carrying the share token.
pub const SHARE_PARAM: &str = "data";

/// Builds a shareable chat link for a persona.
///
/// ```rust
/// use botlink::{Persona, share_url};
///
/// let persona = Persona::new("Tess", "Answer tersely.", "");
/// let url = share_url("https://bots.example/chat/share", &persona);
/// assert!(url.starts_with("https://bots.example/chat/share?data="));
/// ```
pub fn share_url(base: &str, persona: &Persona) -> String {
    let token = encode_share_token(persona);
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{SHARE_PARAM}={token}")
}

/// Extracts the share token from a raw query string, with or without the
/// leading `?`. Returns `None` when the parameter is absent or empty, which
/// the session layer reports as a missing token.
pub fn token_from_query(query: &str) -> Option<&str> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix(SHARE_PARAM)?.strip_prefix('='))
        .filter(|token| !token.is_empty())
}
