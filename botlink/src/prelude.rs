//! Common imports for most botlink applications.

pub use crate::{
    build_session, build_session_with_store, gemini_provider_from_api_key,
    gemini_provider_from_env, gemini_provider_with_config, in_memory_store, persona, share_url,
    token_from_query,
};
pub use crate::{
    BoxFuture, CONNECTION_ERROR_MARKER, ChatSession, ChatStatus, CodecError, Conversation,
    ConversationState, InMemoryPersonaStore, Message, MessageId, ModelProvider, Persona,
    PersonaStore, PersonaSummary, ProviderBuildConfig, ProviderError, ProviderId, Role,
    SessionBundle, SessionError, SessionErrorKind, StoreError, StreamRequest, TurnMessage,
    TurnStream, decode_share_token, encode_share_token,
};
