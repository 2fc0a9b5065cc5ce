//! Persona storage contracts and a basic in-memory implementation.

use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;

use bcodec::Persona;
use bcommon::BoxFuture;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    Backend,
    InvalidPersona,
}

#[derive(Debug, Clone)]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self {
            kind: StoreErrorKind::Backend,
            message: message.into(),
        }
    }

    pub fn invalid_persona(message: impl Into<String>) -> Self {
        Self {
            kind: StoreErrorKind::InvalidPersona,
            message: message.into(),
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for StoreError {}

/// A saved persona as presented in a listing, without the full behavioral
/// instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaSummary {
    pub id: String,
    pub name: String,
    pub avatar_url: String,
    pub created_at: u64,
}

impl From<&Persona> for PersonaSummary {
    fn from(persona: &Persona) -> Self {
        Self {
            id: persona.id.clone(),
            name: persona.name.clone(),
            avatar_url: persona.avatar_url.clone(),
            created_at: persona.created_at,
        }
    }
}

pub trait PersonaStore: Send + Sync {
    fn save<'a>(&'a self, persona: Persona) -> BoxFuture<'a, Result<(), StoreError>>;

    fn list_saved<'a>(&'a self) -> BoxFuture<'a, Result<Vec<PersonaSummary>, StoreError>>;

    fn load<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Option<Persona>, StoreError>>;
}

/// Keeps saved personas in process memory, keyed by id. Listings come back
/// newest first.
#[derive(Debug, Default)]
pub struct InMemoryPersonaStore {
    personas: Mutex<HashMap<String, Persona>>,
}

impl InMemoryPersonaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersonaStore for InMemoryPersonaStore {
    fn save<'a>(&'a self, persona: Persona) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            if persona.name.trim().is_empty() || persona.persona_text.trim().is_empty() {
                return Err(StoreError::invalid_persona(
                    "persona must have a name and a behavioral instruction",
                ));
            }

            let mut personas = self
                .personas
                .lock()
                .map_err(|_| StoreError::backend("persona store lock poisoned"))?;
            personas.insert(persona.id.clone(), persona);

            Ok(())
        })
    }

    fn list_saved<'a>(&'a self) -> BoxFuture<'a, Result<Vec<PersonaSummary>, StoreError>> {
        Box::pin(async move {
            let personas = self
                .personas
                .lock()
                .map_err(|_| StoreError::backend("persona store lock poisoned"))?;

            let mut summaries: Vec<PersonaSummary> =
                personas.values().map(PersonaSummary::from).collect();
            summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

            Ok(summaries)
        })
    }

    fn load<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Option<Persona>, StoreError>> {
        Box::pin(async move {
            let personas = self
                .personas
                .lock()
                .map_err(|_| StoreError::backend("persona store lock poisoned"))?;

            Ok(personas.get(id).cloned())
        })
    }
}

#[cfg(test)]
mod tests {
    use bcodec::Persona;

    use super::{InMemoryPersonaStore, PersonaStore, StoreErrorKind};

    fn persona(name: &str, created_at: u64) -> Persona {
        let mut persona = Persona::new(name, "Answer tersely.", "");
        persona.id = format!("bot-{name}");
        persona.created_at = created_at;
        persona
    }

    #[tokio::test]
    async fn save_then_load_returns_the_same_persona() {
        let store = InMemoryPersonaStore::new();
        let tess = persona("Tess", 10);

        store.save(tess.clone()).await.expect("save succeeds");
        let loaded = store.load("bot-Tess").await.expect("load succeeds");

        assert_eq!(loaded, Some(tess));
    }

    #[tokio::test]
    async fn list_saved_orders_newest_first() {
        let store = InMemoryPersonaStore::new();
        store.save(persona("Old", 10)).await.expect("save succeeds");
        store.save(persona("New", 20)).await.expect("save succeeds");

        let summaries = store.list_saved().await.expect("list succeeds");
        let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();

        assert_eq!(names, ["New", "Old"]);
    }

    #[tokio::test]
    async fn save_rejects_a_blank_persona() {
        let store = InMemoryPersonaStore::new();
        let blank = Persona::new("   ", "Answer tersely.", "");

        let error = store.save(blank).await.expect_err("must reject");
        assert_eq!(error.kind, StoreErrorKind::InvalidPersona);
    }

    #[tokio::test]
    async fn load_of_an_unknown_id_is_none() {
        let store = InMemoryPersonaStore::new();
        let loaded = store.load("missing").await.expect("load succeeds");
        assert_eq!(loaded, None);
    }
}
