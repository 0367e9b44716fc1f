//! Persona storage for the Travelbot backend
//!
//! This crate owns the persisted shape of a custom persona and the
//! [`PersonaStore`] abstraction the backend's persona catalog reads and writes
//! through. Two backings are provided: one JSON file per persona on disk, and
//! an in-memory map.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

mod error;
mod file_system;
mod memory;
mod persona;
mod store;

pub use error::{PersonaStorageError, PersonaStorageResult};
pub use file_system::FileSystemPersonaStore;
pub use memory::InMemoryPersonaStore;
pub use persona::{validate_id, Persona, VoiceProfile};
pub use store::PersonaStore;
