//! Provider construction and session wiring helpers.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::{
    ChatSession, InMemoryPersonaStore, ModelProvider, PersonaStore, ProviderError, SessionError,
};

/// Environment variable holding the Gemini API key. There is no baked-in
/// fallback key; construction fails when the variable is absent.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone)]
pub struct ProviderBuildConfig {
    pub api_key: String,
    pub timeout: Duration,
}

impl ProviderBuildConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            timeout: Duration::from_secs(90),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub fn gemini_provider_from_api_key(
    api_key: impl Into<String>,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    gemini_provider_with_config(ProviderBuildConfig::new(api_key))
}

/// Reads the API key from [`GEMINI_API_KEY_VAR`]. A missing or blank
/// variable is an immediate authentication error rather than a deferred
/// request failure.
pub fn gemini_provider_from_env() -> Result<Arc<dyn ModelProvider>, ProviderError> {
    let api_key = std::env::var(GEMINI_API_KEY_VAR)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            ProviderError::authentication(format!("{GEMINI_API_KEY_VAR} is not set"))
        })?;

    gemini_provider_from_api_key(api_key)
}

pub fn gemini_provider_with_config(
    config: ProviderBuildConfig,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    let api_key = config.api_key.trim().to_string();
    if api_key.is_empty() {
        return Err(ProviderError::authentication(
            "Gemini API key must not be empty",
        ));
    }

    let http = Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|err| ProviderError::transport(err.to_string()))?;

    build_gemini_provider(api_key, http)
}

#[cfg(feature = "provider-gemini")]
fn build_gemini_provider(
    api_key: String,
    http: Client,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    use bprovider::SecureCredentialManager;
    use bprovider::adapters::gemini::GeminiProvider;

    let credentials = Arc::new(SecureCredentialManager::new());
    credentials.set_gemini_api_key(api_key)?;
    let transport = Arc::new(GeminiProvider::default_http_transport(http));
    Ok(Arc::new(GeminiProvider::new(credentials, transport)))
}

#[cfg(not(feature = "provider-gemini"))]
fn build_gemini_provider(
    _api_key: String,
    _http: Client,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    Err(ProviderError::invalid_request(
        "provider-gemini feature is not enabled on botlink",
    ))
}

/// A bootstrapped session together with the persona store backing the
/// application around it.
#[derive(Clone)]
pub struct SessionBundle {
    pub store: Arc<dyn PersonaStore>,
    pub session: ChatSession,
}

impl std::fmt::Debug for SessionBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBundle").finish_non_exhaustive()
    }
}

pub fn in_memory_store() -> Arc<dyn PersonaStore> {
    Arc::new(InMemoryPersonaStore::new())
}

/// Convenience constructor for a freshly authored persona.
pub fn persona(
    name: impl Into<String>,
    persona_text: impl Into<String>,
    avatar_url: impl Into<String>,
) -> bcodec::Persona {
    bcodec::Persona::new(name, persona_text, avatar_url)
}

pub fn build_session(
    token: Option<&str>,
    provider: Arc<dyn ModelProvider>,
) -> Result<SessionBundle, SessionError> {
    build_session_with_store(token, provider, in_memory_store())
}

pub fn build_session_with_store(
    token: Option<&str>,
    provider: Arc<dyn ModelProvider>,
    store: Arc<dyn PersonaStore>,
) -> Result<SessionBundle, SessionError> {
    let session = ChatSession::start(token, provider)?;
    Ok(SessionBundle { store, session })
}
