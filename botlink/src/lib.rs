//! Unified facade over the botlink workspace crates.
//!
//! This crate is designed to be the single dependency for most
//! applications: it re-exports the core botlink crates and provides the
//! session, sharing, storage, and provider-wiring surfaces on top of them.
//!
//! ```rust
//! use botlink::{Persona, encode_share_token, token_from_query};
//!
//! let persona = Persona::new("Tess", "Answer tersely.", "");
//! let token = encode_share_token(&persona);
//! let query = format!("data={token}");
//! assert_eq!(token_from_query(&query), Some(token.as_str()));
//! ```

mod link;
mod runtime;
mod session;
mod store;

pub mod prelude;

pub use bchat;
pub use bcodec;
pub use bcommon;
pub use bprovider;

pub use bchat::{
    CONNECTION_ERROR_MARKER, ChatStatus, Conversation, ConversationState, Message,
    MessageIdGenerator, TurnStream,
};
pub use bcodec::{
    CodecError, CodecErrorKind, Persona, decode_share_token, encode_share_token,
};
pub use bcommon::{BoxFuture, MessageId, unix_millis};
pub use bprovider::{
    BoxedFragmentStream, FragmentStream, ModelProvider, ProviderError, ProviderErrorKind,
    ProviderFuture, ProviderId, Role, SecretString, SecureCredentialManager, StreamRequest,
    TurnMessage, VecFragmentStream,
};

pub use link::{SHARE_PARAM, share_url, token_from_query};
pub use runtime::{
    GEMINI_API_KEY_VAR, ProviderBuildConfig, SessionBundle, build_session,
    build_session_with_store, gemini_provider_from_api_key, gemini_provider_from_env,
    gemini_provider_with_config, in_memory_store, persona,
};
pub use session::{ChatSession, SessionError, SessionErrorKind};
pub use store::{InMemoryPersonaStore, PersonaStore, PersonaSummary, StoreError, StoreErrorKind};
