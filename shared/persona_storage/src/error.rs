//! Error types for persona storage operations

use thiserror::Error;

/// Result type alias for persona storage operations
pub type PersonaStorageResult<T> = Result<T, PersonaStorageError>;

/// Storage error types for persona operations
#[derive(Debug, Error)]
pub enum PersonaStorageError {
    /// Persona id is empty or contains characters outside `[a-z0-9_-]`
    #[error("Invalid persona id: {0:?}")]
    InvalidId(String),

    /// Failed to read from or write to the backing store
    #[error("Failed to access persona store: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record could not be parsed as a persona
    #[error("Malformed persona record {id}: {source}")]
    Malformed {
        /// Id of the offending record
        id: String,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize a persona before writing it
    #[error("Failed to serialize persona: {0}")]
    SerializationError(String),
}
