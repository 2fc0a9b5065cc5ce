//! Streaming model-provider contracts and the Gemini adapter.
//!
//! The conversation engine talks to a backend exclusively through the
//! [`ModelProvider`] trait: given a persona, a read-only history snapshot,
//! and a new user message, a provider produces a lazy stream of text
//! fragments. Everything backend-specific (model selection, temperature,
//! persona injection, authentication) lives behind that seam.

mod credentials;
mod error;
mod model;
mod provider;
mod stream;

pub mod adapters;

pub use credentials::{SecretString, SecureCredentialManager};
pub use error::{ProviderError, ProviderErrorKind};
pub use model::{Role, StreamRequest, TurnMessage};
pub use provider::{ModelProvider, ProviderFuture, ProviderId};
pub use stream::{BoxedFragmentStream, FragmentStream, VecFragmentStream};
