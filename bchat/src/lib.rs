//! The streaming conversation engine.
//!
//! A [`Conversation`] owns the message history, drives the
//! Idle → Sending → Streaming state machine, folds text fragments into the
//! open response message one at a time, and republishes a consistent state
//! snapshot after every transition. Failures never leave a message
//! half-written: the open message is finalized with a fixed marker and the
//! conversation lands in [`ChatStatus::Error`], from which the next submit
//! re-enters normally.

mod engine;
mod ids;
mod types;

pub use engine::{CONNECTION_ERROR_MARKER, Conversation};
pub use ids::MessageIdGenerator;
pub use types::{ChatStatus, ConversationState, Message, TurnStream};

pub use bcommon::MessageId;
pub use bprovider::Role;
