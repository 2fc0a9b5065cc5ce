//! The persona value type.

use bcommon::unix_millis;
use serde::{Deserialize, Serialize};

/// An author-defined behavioral instruction plus display metadata.
///
/// Immutable once created. `persona_text` is the system-level instruction
/// sent with every model request; the remaining fields are presentation
/// metadata. A persona has no identity beyond its content, so it is
/// embedded by value into the share token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub persona_text: String,
    pub avatar_url: String,
    pub created_at: u64,
}

impl Persona {
    /// Creates a persona stamped with the current wall clock. The id is the
    /// creation instant rendered as a string.
    pub fn new(
        name: impl Into<String>,
        persona_text: impl Into<String>,
        avatar_url: impl Into<String>,
    ) -> Self {
        let created_at = unix_millis();
        Self {
            id: created_at.to_string(),
            name: name.into(),
            persona_text: persona_text.into(),
            avatar_url: avatar_url.into(),
            created_at,
        }
    }
}
