//! Secure in-memory credential management.
//!
//! There is deliberately no fallback credential anywhere in this crate: a
//! provider asked to stream without a configured key fails with an
//! authentication error instead of substituting a baked-in value.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::{ProviderError, ProviderId};

/// An API key that redacts itself in debug output and zeroes its bytes on
/// drop.
#[derive(PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}

#[derive(Default)]
pub struct SecureCredentialManager {
    api_keys: Mutex<HashMap<ProviderId, SecretString>>,
}

impl SecureCredentialManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_api_key(
        &self,
        provider: ProviderId,
        api_key: impl Into<String>,
    ) -> Result<(), ProviderError> {
        let api_key = SecretString::new(api_key);
        if api_key.is_empty() {
            return Err(ProviderError::authentication("api key must not be empty"));
        }

        self.keys_mut()?.insert(provider, api_key);
        Ok(())
    }

    pub fn has_credentials(&self, provider: ProviderId) -> Result<bool, ProviderError> {
        Ok(self.keys_mut()?.contains_key(&provider))
    }

    pub fn with_api_key<R>(
        &self,
        provider: ProviderId,
        f: impl FnOnce(&str) -> R,
    ) -> Result<Option<R>, ProviderError> {
        let keys = self.keys_mut()?;
        Ok(keys.get(&provider).map(|secret| f(secret.expose())))
    }

    pub fn clear(&self, provider: ProviderId) -> Result<bool, ProviderError> {
        Ok(self.keys_mut()?.remove(&provider).is_some())
    }

    fn keys_mut(&self) -> Result<MutexGuard<'_, HashMap<ProviderId, SecretString>>, ProviderError> {
        self.api_keys
            .lock()
            .map_err(|_| ProviderError::other("credential manager lock poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use super::{SecretString, SecureCredentialManager};
    use crate::{ProviderErrorKind, ProviderId};

    #[test]
    fn secret_string_redacts_debug_output() {
        let secret = SecretString::new("AIzaSomethingSecret");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(secret.expose(), "AIzaSomethingSecret");
    }

    #[test]
    fn manager_stores_and_clears_keys() {
        let manager = SecureCredentialManager::new();
        assert!(!manager.has_credentials(ProviderId::Gemini).unwrap());

        manager
            .set_api_key(ProviderId::Gemini, "AIzaExample")
            .expect("key should set");
        assert!(manager.has_credentials(ProviderId::Gemini).unwrap());

        let seen = manager
            .with_api_key(ProviderId::Gemini, |key| key.to_string())
            .expect("lock")
            .expect("key should exist");
        assert_eq!(seen, "AIzaExample");

        assert!(manager.clear(ProviderId::Gemini).unwrap());
        assert!(!manager.has_credentials(ProviderId::Gemini).unwrap());
    }

    #[test]
    fn empty_keys_are_rejected() {
        let manager = SecureCredentialManager::new();
        let error = manager
            .set_api_key(ProviderId::Gemini, "")
            .expect_err("empty key must fail");
        assert_eq!(error.kind, ProviderErrorKind::Authentication);
    }
}
