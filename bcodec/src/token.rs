//! Share-token encoding and decoding.
//!
//! A token is URL-safe base64 (no padding) over the persona's JSON
//! serialization. Decoding is all-or-nothing: a token either reconstructs
//! a whole persona or fails with a [`CodecError`], never a partially
//! populated value.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

use crate::{CodecError, Persona};

/// Serializes the persona into a single URL-safe string.
pub fn encode_share_token(persona: &Persona) -> String {
    let json = serde_json::to_vec(persona).expect("persona always serializes");
    URL_SAFE_NO_PAD.encode(json)
}

/// Reconstructs a persona from a share token.
///
/// `name` and `personaText` are required and must be non-blank; `id`,
/// `avatarUrl`, and `createdAt` default when absent, since the token itself
/// is the persona's identity.
pub fn decode_share_token(token: &str) -> Result<Persona, CodecError> {
    let json = URL_SAFE_NO_PAD
        .decode(token.trim())
        .map_err(|err| CodecError::malformed(format!("share token is not valid base64: {err}")))?;

    let payload: TokenPayload = serde_json::from_slice(&json)
        .map_err(|err| CodecError::malformed(format!("share token is not valid JSON: {err}")))?;

    payload.into_persona()
}

/// Raw wire shape. Every field is optional so that a structurally
/// incomplete token is classified as incomplete rather than malformed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenPayload {
    id: Option<String>,
    name: Option<String>,
    persona_text: Option<String>,
    avatar_url: Option<String>,
    created_at: Option<u64>,
}

impl TokenPayload {
    fn into_persona(self) -> Result<Persona, CodecError> {
        let name = require_text(self.name, "name")?;
        let persona_text = require_text(self.persona_text, "personaText")?;

        Ok(Persona {
            id: self.id.unwrap_or_default(),
            name,
            persona_text,
            avatar_url: self.avatar_url.unwrap_or_default(),
            created_at: self.created_at.unwrap_or_default(),
        })
    }
}

fn require_text(value: Option<String>, field: &str) -> Result<String, CodecError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        Some(_) => Err(CodecError::incomplete(format!(
            "share token field '{field}' is blank"
        ))),
        None => Err(CodecError::incomplete(format!(
            "share token is missing required field '{field}'"
        ))),
    }
}
