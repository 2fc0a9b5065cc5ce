//! Conversation messages, status, and published state snapshots.

use std::pin::Pin;

use bcommon::MessageId;
use bprovider::Role;
use futures_core::Stream;

/// One turn in the conversation. A `user` message's text is fixed at
/// creation; a `model` message starts as an empty placeholder and grows as
/// fragments arrive, after which it is never touched again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub text: String,
    pub timestamp: u64,
}

impl Message {
    pub fn new(id: MessageId, role: Role, text: impl Into<String>, timestamp: u64) -> Self {
        Self {
            id,
            role,
            text: text.into(),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatStatus {
    Idle,
    Sending,
    Streaming,
    Error,
}

/// Everything a consumer needs to render the conversation. Snapshots are
/// cloned out of the engine, so a published state never changes under the
/// consumer's feet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationState {
    pub history: Vec<Message>,
    pub status: ChatStatus,
    pub pending_input: String,
}

impl ConversationState {
    pub fn is_busy(&self) -> bool {
        matches!(self.status, ChatStatus::Sending | ChatStatus::Streaming)
    }
}

/// State snapshots published over the course of one accepted submission:
/// one after the send begins, one per folded fragment, and one terminal
/// snapshot (Idle on completion, Error on failure).
pub type TurnStream = Pin<Box<dyn Stream<Item = ConversationState> + Send>>;
