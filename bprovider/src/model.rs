//! Request types crossing the provider seam.

use crate::ProviderError;

/// Who authored a conversation turn.
///
/// Deliberately closed: adapters map each variant to their backend's
/// vocabulary with an exhaustive match, so an unrecognized role is a
/// compile-time impossibility rather than a silent coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Model,
}

/// A read-only snapshot of one prior turn, as handed to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnMessage {
    pub role: Role,
    pub text: String,
}

impl TurnMessage {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Everything a provider needs to produce one streamed response: the
/// persona's behavioral instruction, the history so far, and the new user
/// message. Model selection and sampling settings are the adapter's
/// business, not the caller's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
    pub persona: String,
    pub history: Vec<TurnMessage>,
    pub user_text: String,
}

impl StreamRequest {
    pub fn new(
        persona: impl Into<String>,
        history: Vec<TurnMessage>,
        user_text: impl Into<String>,
    ) -> Self {
        Self {
            persona: persona.into(),
            history,
            user_text: user_text.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.persona.trim().is_empty() {
            return Err(ProviderError::invalid_request(
                "persona instruction must not be empty",
            ));
        }

        if self.user_text.trim().is_empty() {
            return Err(ProviderError::invalid_request(
                "user message must not be empty",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Role, StreamRequest, TurnMessage};
    use crate::ProviderErrorKind;

    #[test]
    fn validate_enforces_the_request_contract() {
        let blank_persona = StreamRequest::new("   ", Vec::new(), "hi");
        let error = blank_persona.validate().expect_err("blank persona must fail");
        assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);

        let blank_text = StreamRequest::new("Be terse.", Vec::new(), "  \n ");
        let error = blank_text.validate().expect_err("blank text must fail");
        assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);

        let valid = StreamRequest::new(
            "Be terse.",
            vec![TurnMessage::new(Role::User, "earlier question")],
            "hi",
        );
        assert!(valid.validate().is_ok());
    }
}
