//! Error types for persona catalog operations

use persona_storage::PersonaStorageError;
use thiserror::Error;

/// Persona catalog error types
#[derive(Debug, Error)]
pub enum PersonaCatalogError {
    /// No custom persona is stored under the id
    #[error("Persona not found: {0}")]
    NotFound(String),

    /// A persona to be saved failed validation
    #[error("{0}")]
    Invalid(&'static str),

    /// The persona store failed
    #[error(transparent)]
    Storage(#[from] PersonaStorageError),
}
