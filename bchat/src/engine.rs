//! The conversation state machine and fragment folding loop.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_stream::stream;
use bcodec::Persona;
use bcommon::MessageId;
use bprovider::{ModelProvider, ProviderError, Role, StreamRequest, TurnMessage};
use futures_util::StreamExt;

use crate::ids::MessageIdGenerator;
use crate::types::{ChatStatus, ConversationState, Message, TurnStream};

/// Fixed user-facing text written into the open model message when a
/// stream fails. Backend error detail never reaches the history; it goes
/// to the log instead.
pub const CONNECTION_ERROR_MARKER: &str = "⚠️ Connection error. Please try again.";

struct ConversationInner {
    persona: Persona,
    history: Vec<Message>,
    status: ChatStatus,
    pending_input: String,
    ids: MessageIdGenerator,
}

/// Drives one persona's conversation.
///
/// Cheap to clone; clones share the same history and status. History is
/// owned exclusively by the engine: providers receive a read-only snapshot
/// per request and consumers receive cloned [`ConversationState`] values.
#[derive(Clone)]
pub struct Conversation {
    provider: Arc<dyn ModelProvider>,
    inner: Arc<Mutex<ConversationInner>>,
}

impl Conversation {
    /// Starts an idle conversation with an empty history.
    pub fn new(persona: Persona, provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            inner: Arc::new(Mutex::new(ConversationInner {
                persona,
                history: Vec::new(),
                status: ChatStatus::Idle,
                pending_input: String::new(),
                ids: MessageIdGenerator::new(),
            })),
        }
    }

    pub fn persona(&self) -> Persona {
        self.lock().persona.clone()
    }

    /// Current state snapshot.
    pub fn state(&self) -> ConversationState {
        let inner = self.lock();
        ConversationState {
            history: inner.history.clone(),
            status: inner.status,
            pending_input: inner.pending_input.clone(),
        }
    }

    /// Mirrors the consumer's input buffer into the published state.
    pub fn set_pending_input(&self, text: impl Into<String>) {
        self.lock().pending_input = text.into();
    }

    /// Submits a user message and returns the stream of state snapshots
    /// for the turn.
    ///
    /// Returns `None` without touching any state when the text is blank or
    /// a turn is already in flight. Rejection at this boundary is what
    /// keeps the at-most-one-open-stream invariant without any further
    /// locking.
    pub fn submit(&self, text: impl Into<String>) -> Option<TurnStream> {
        let text = text.into();
        if text.trim().is_empty() {
            return None;
        }

        let (request, open_id) = {
            let mut inner = self.lock();
            if matches!(inner.status, ChatStatus::Sending | ChatStatus::Streaming) {
                return None;
            }

            let snapshot = inner
                .history
                .iter()
                .map(|message| TurnMessage::new(message.role, message.text.clone()))
                .collect::<Vec<_>>();

            let (user_id, model_id) = inner.ids.next_pair();
            let timestamp = user_id.as_u64();
            inner
                .history
                .push(Message::new(user_id, Role::User, text.clone(), timestamp));
            inner
                .history
                .push(Message::new(model_id, Role::Model, "", timestamp));
            inner.pending_input.clear();
            inner.status = ChatStatus::Sending;

            let persona_text = inner.persona.persona_text.clone();
            (StreamRequest::new(persona_text, snapshot, text), model_id)
        };

        tracing::debug!(open_id = %open_id, "turn accepted");

        let conversation = self.clone();
        Some(Box::pin(stream! {
            yield conversation.state();

            match conversation.provider.stream(request).await {
                Err(error) => {
                    conversation.fail_turn(open_id, &error);
                    yield conversation.state();
                }
                Ok(mut fragments) => loop {
                    match fragments.next().await {
                        Some(Ok(fragment)) => {
                            conversation.fold_fragment(open_id, &fragment);
                            yield conversation.state();
                        }
                        Some(Err(error)) => {
                            conversation.fail_turn(open_id, &error);
                            yield conversation.state();
                            break;
                        }
                        None => {
                            conversation.finish_turn();
                            yield conversation.state();
                            break;
                        }
                    }
                },
            }
        }))
    }

    /// Appends one fragment to the open model message, replacing the entry
    /// with a new value rather than mutating text visible to an already
    /// published snapshot.
    fn fold_fragment(&self, open_id: MessageId, fragment: &str) {
        let mut inner = self.lock();
        inner.status = ChatStatus::Streaming;

        if let Some(entry) = inner.history.iter_mut().find(|m| m.id == open_id) {
            let mut updated = entry.clone();
            updated.text.push_str(fragment);
            *entry = updated;
        }
    }

    /// Finalizes the open message with the fixed error marker. Any partial
    /// text is discarded; a failed turn never masquerades as a short
    /// answer.
    fn fail_turn(&self, open_id: MessageId, error: &ProviderError) {
        tracing::warn!(kind = ?error.kind, %error, "transport failure during turn");

        let mut inner = self.lock();
        if let Some(entry) = inner.history.iter_mut().find(|m| m.id == open_id) {
            let mut updated = entry.clone();
            updated.text = CONNECTION_ERROR_MARKER.to_string();
            *entry = updated;
        }

        inner.status = ChatStatus::Error;
    }

    fn finish_turn(&self) {
        self.lock().status = ChatStatus::Idle;
    }

    fn lock(&self) -> MutexGuard<'_, ConversationInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
