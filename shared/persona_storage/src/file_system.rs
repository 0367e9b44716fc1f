//! Directory-backed persona store

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;

use crate::{validate_id, Persona, PersonaStorageResult, PersonaStore};

/// File extension of persona records
const RECORD_EXTENSION: &str = "json";

/// Sequence number making every temporary record name unique within the process
static WRITE_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Persona store keeping one JSON file per persona.
///
/// Directory structure:
/// ```text
/// persona_dir/
/// ├── <id-1>.json
/// └── <id-2>.json
/// ```
///
/// The directory is created on first write; a missing directory lists as empty.
#[derive(Debug, Clone)]
pub struct FileSystemPersonaStore {
    dir: PathBuf,
}

impl FileSystemPersonaStore {
    /// Creates a store rooted at `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the records live in
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{RECORD_EXTENSION}"))
    }

    /// Fresh sibling path for one write; never ends in the record extension
    fn temp_path(&self, id: &str) -> PathBuf {
        let sequence = WRITE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!(".{id}.{}.{sequence}.tmp", std::process::id()))
    }
}

#[async_trait]
impl PersonaStore for FileSystemPersonaStore {
    async fn get(&self, id: &str) -> PersonaStorageResult<Option<Persona>> {
        validate_id(id)?;

        let raw = match fs::read_to_string(self.record_path(id)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Persona::from_record(id, &raw).map(Some)
    }

    async fn put(&self, persona: &Persona) -> PersonaStorageResult<()> {
        validate_id(&persona.id)?;
        let record = persona.to_record()?;

        fs::create_dir_all(&self.dir).await?;

        // Write to a sibling file first so readers never observe a partial record
        let path = self.record_path(&persona.id);
        let tmp_path = self.temp_path(&persona.id);
        if let Err(e) = fs::write(&tmp_path, record).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        fs::rename(&tmp_path, &path).await?;

        tracing::debug!(id = %persona.id, path = %path.display(), "Persona record written");
        Ok(())
    }

    async fn list_ids(&self) -> PersonaStorageResult<Vec<String>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if validate_id(id).is_ok() {
                ids.push(id.to_string());
            } else {
                tracing::debug!(path = %path.display(), "Ignoring file with invalid persona id");
            }
        }

        ids.sort();
        Ok(ids)
    }
}
