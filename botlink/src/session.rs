//! Session bootstrap from a share token.
//!
//! A chat session only exists once a persona has been recovered from a
//! share token. Both failure shapes are reported distinctly so callers can
//! render "no bot was shared" and "this link is broken" differently, and
//! neither produces a conversation.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use bchat::{Conversation, ConversationState, TurnStream};
use bcodec::{CodecError, Persona, decode_share_token};
use bprovider::ModelProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionErrorKind {
    /// No token was supplied at all.
    MissingToken,
    /// A token was supplied but could not be decoded into a persona.
    InvalidToken,
}

#[derive(Debug, Clone)]
pub struct SessionError {
    pub kind: SessionErrorKind,
    pub message: String,
}

impl SessionError {
    pub fn missing_token() -> Self {
        Self {
            kind: SessionErrorKind::MissingToken,
            message: "no share token was provided".to_string(),
        }
    }

    pub fn invalid_token(cause: &CodecError) -> Self {
        Self {
            kind: SessionErrorKind::InvalidToken,
            message: format!("share token could not be decoded: {cause}"),
        }
    }
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for SessionError {}

/// A bootstrapped conversation bound to the persona recovered from a share
/// token.
#[derive(Clone)]
pub struct ChatSession {
    persona: Persona,
    conversation: Conversation,
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession").finish_non_exhaustive()
    }
}

impl ChatSession {
    /// Decodes the token and opens an idle conversation with the recovered
    /// persona. `None` and an undecodable token are distinct failures;
    /// neither leaves a partially constructed session behind.
    pub fn start(
        token: Option<&str>,
        provider: Arc<dyn ModelProvider>,
    ) -> Result<Self, SessionError> {
        let token = token.ok_or_else(SessionError::missing_token)?;
        let persona = decode_share_token(token).map_err(|error| {
            tracing::warn!(%error, "rejecting share token");
            SessionError::invalid_token(&error)
        })?;

        tracing::info!(persona = %persona.name, "session started from share token");
        Ok(Self::with_persona(persona, provider))
    }

    /// Opens a session directly from a persona, bypassing token decoding.
    /// This is the path for a freshly created persona that has not been
    /// shared yet.
    pub fn with_persona(persona: Persona, provider: Arc<dyn ModelProvider>) -> Self {
        let conversation = Conversation::new(persona.clone(), provider);
        Self {
            persona,
            conversation,
        }
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn state(&self) -> ConversationState {
        self.conversation.state()
    }

    pub fn set_pending_input(&self, text: impl Into<String>) {
        self.conversation.set_pending_input(text);
    }

    /// See [`Conversation::submit`].
    pub fn submit(&self, text: impl Into<String>) -> Option<TurnStream> {
        self.conversation.submit(text)
    }
}
