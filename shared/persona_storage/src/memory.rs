//! In-memory persona store

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{validate_id, Persona, PersonaStorageResult, PersonaStore};

/// Persona store backed by a map of raw JSON records.
///
/// Records are kept in their serialized form so they go through the same
/// parsing path as records read from disk.
#[derive(Debug, Default)]
pub struct InMemoryPersonaStore {
    records: RwLock<HashMap<String, String>>,
}

impl InMemoryPersonaStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a raw record under `id` without parsing it
    ///
    /// # Errors
    ///
    /// Returns `PersonaStorageError::InvalidId` if `id` is not a valid key
    pub async fn insert_raw(&self, id: &str, raw: impl Into<String>) -> PersonaStorageResult<()> {
        validate_id(id)?;
        self.records.write().await.insert(id.to_string(), raw.into());
        Ok(())
    }

    /// Number of stored records, parsable or not
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl PersonaStore for InMemoryPersonaStore {
    async fn get(&self, id: &str) -> PersonaStorageResult<Option<Persona>> {
        validate_id(id)?;
        let records = self.records.read().await;
        records
            .get(id)
            .map(|raw| Persona::from_record(id, raw))
            .transpose()
    }

    async fn put(&self, persona: &Persona) -> PersonaStorageResult<()> {
        validate_id(&persona.id)?;
        let record = persona.to_record()?;
        self.records
            .write()
            .await
            .insert(persona.id.clone(), record);
        Ok(())
    }

    async fn list_ids(&self) -> PersonaStorageResult<Vec<String>> {
        let mut ids: Vec<String> = self.records.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
