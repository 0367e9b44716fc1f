use async_trait::async_trait;

use crate::{Persona, PersonaStorageResult};

/// Key-value store of persona records.
///
/// Implementations decide where records live; callers only see ids and
/// parsed [`Persona`] values.
#[async_trait]
pub trait PersonaStore: Send + Sync {
    /// Reads one persona by id. Returns `Ok(None)` when no record exists.
    async fn get(&self, id: &str) -> PersonaStorageResult<Option<Persona>>;

    /// Writes one persona under `persona.id`, replacing any existing record.
    async fn put(&self, persona: &Persona) -> PersonaStorageResult<()>;

    /// Lists the ids of all stored records, sorted.
    async fn list_ids(&self) -> PersonaStorageResult<Vec<String>>;

    /// Reads every stored record one after another.
    ///
    /// Individual read failures are returned in place so the caller decides
    /// whether one bad record spoils the batch. Records removed between
    /// listing and reading are left out.
    async fn list_all(&self) -> PersonaStorageResult<Vec<PersonaStorageResult<Persona>>> {
        let ids = self.list_ids().await?;
        let mut records = Vec::with_capacity(ids.len());

        for id in ids {
            match self.get(&id).await {
                Ok(Some(persona)) => records.push(Ok(persona)),
                Ok(None) => {}
                Err(e) => records.push(Err(e)),
            }
        }

        Ok(records)
    }
}
