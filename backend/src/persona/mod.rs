//! Persona lookup: builtin styles defined in code and custom personas kept in
//! a [`PersonaStore`].

mod builtin;
mod error;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use persona_storage::{Persona, PersonaStorageResult, PersonaStore, VoiceProfile};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::instrument;
use validator::Validate;

pub use builtin::BuiltinStyle;
pub use error::PersonaCatalogError;

use crate::cache::CacheManager;

/// Maximum length of an id derived from a persona name
const MAX_SLUG_LENGTH: usize = 64;

/// Public projection of a custom persona used in the marketplace listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct PersonaMarketplaceEntry {
    /// Display name
    pub name: String,
    /// Public description
    pub description: String,
}

impl From<Persona> for PersonaMarketplaceEntry {
    fn from(persona: Persona) -> Self {
        Self {
            name: persona.name,
            description: persona.description,
        }
    }
}

/// A custom persona submitted for saving.
///
/// Missing fields deserialize as empty so that [`PersonaCatalog::save`] can
/// reject them with its own message.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct NewPersona {
    /// Display name, also the source of the persona id
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: String,
    /// Public description
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: String,
    /// Voice/tone template; derived from name and description when absent
    #[validate(length(max = 4000, message = "System prompt must be at most 4000 characters"))]
    pub system_prompt: Option<String>,
    /// Per-language literal substitutions
    pub language_overrides: BTreeMap<String, BTreeMap<String, String>>,
    /// Optional text-to-speech settings
    pub voice: Option<VoiceProfile>,
}

/// Resolves persona identifiers to persona definitions
pub struct PersonaCatalog {
    store: Arc<dyn PersonaStore>,
    builtin_listing: CacheManager<&'static str, Vec<BuiltinStyle>>,
    builtin_cache_ttl: Duration,
}

impl PersonaCatalog {
    /// Creates a catalog over `store`, caching the builtin listing for `builtin_cache_ttl`
    #[must_use]
    pub fn new(store: Arc<dyn PersonaStore>, builtin_cache_ttl: Duration) -> Self {
        Self {
            store,
            builtin_listing: CacheManager::new(1),
            builtin_cache_ttl,
        }
    }

    /// Lists the builtin styles, default first
    pub async fn list_builtins(&self) -> Vec<BuiltinStyle> {
        let listing = self
            .builtin_listing
            .get_or_try_insert_with("builtins", self.builtin_cache_ttl, || async {
                Ok::<_, std::convert::Infallible>(BuiltinStyle::iter().collect())
            })
            .await;

        match listing {
            Ok(styles) => styles,
            Err(never) => match never {},
        }
    }

    /// Resolves a style to its builtin persona; unknown styles get the default persona
    #[must_use]
    pub fn resolve_builtin(&self, style: &str) -> Persona {
        BuiltinStyle::from_style(style).persona()
    }

    /// Loads one custom persona
    ///
    /// # Errors
    ///
    /// - `PersonaCatalogError::NotFound` - no persona is stored under `id`
    /// - `PersonaCatalogError::Storage` - the id is invalid or the store failed
    #[instrument(skip(self))]
    pub async fn load_custom(&self, id: &str) -> Result<Persona, PersonaCatalogError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| PersonaCatalogError::NotFound(id.to_string()))
    }

    /// Lists all custom personas, reading records one after another.
    ///
    /// Malformed or unreadable records are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns `PersonaCatalogError::Storage` if the store cannot be enumerated
    #[instrument(skip(self))]
    pub async fn list_custom(&self) -> Result<Vec<PersonaMarketplaceEntry>, PersonaCatalogError> {
        let records = self.store.list_all().await?;
        Ok(into_marketplace(records))
    }

    /// Lists all custom personas with every record read issued concurrently.
    ///
    /// Same result and skip policy as [`Self::list_custom`]; entries are sorted
    /// by name so the result does not depend on read completion order.
    ///
    /// # Errors
    ///
    /// Returns `PersonaCatalogError::Storage` if the store cannot be enumerated
    #[instrument(skip(self))]
    pub async fn list_custom_concurrently(
        &self,
    ) -> Result<Vec<PersonaMarketplaceEntry>, PersonaCatalogError> {
        let ids = self.store.list_ids().await?;

        let reads = ids.iter().map(|id| self.store.get(id));
        let records = join_all(reads)
            .await
            .into_iter()
            .filter_map(Result::transpose)
            .collect();

        Ok(into_marketplace(records))
    }

    /// Validates and stores a new custom persona, returning it with its assigned id
    ///
    /// # Errors
    ///
    /// - `PersonaCatalogError::Invalid` - name or description is empty, or the
    ///   name yields no usable id
    /// - `PersonaCatalogError::Storage` - the store failed
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn save(&self, draft: NewPersona) -> Result<Persona, PersonaCatalogError> {
        let name = draft.name.trim();
        let description = draft.description.trim();
        if name.is_empty() || description.is_empty() {
            return Err(PersonaCatalogError::Invalid(
                "Name and description are required",
            ));
        }

        let id = slugify(name);
        if id.is_empty() {
            return Err(PersonaCatalogError::Invalid(
                "Name must contain at least one letter or digit",
            ));
        }

        let system_prompt = draft
            .system_prompt
            .map(|prompt| prompt.trim().to_string())
            .filter(|prompt| !prompt.is_empty())
            .unwrap_or_else(|| format!("Je bent {name}. {description}"));

        let persona = Persona {
            id,
            name: name.to_string(),
            description: description.to_string(),
            system_prompt,
            language_overrides: draft.language_overrides,
            voice: draft.voice,
        };

        self.store.put(&persona).await?;
        tracing::info!(id = %persona.id, "Custom persona saved");
        Ok(persona)
    }
}

/// Drops failed reads (logging them), sorts by name then id, and projects to
/// marketplace entries
fn into_marketplace(records: Vec<PersonaStorageResult<Persona>>) -> Vec<PersonaMarketplaceEntry> {
    let mut personas: Vec<Persona> = records
        .into_iter()
        .filter_map(|record| {
            record
                .map_err(|e| tracing::warn!(error = %e, "Skipping unreadable persona record"))
                .ok()
        })
        .collect();

    personas.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    personas.into_iter().map(Into::into).collect()
}

/// Lowercase `[a-z0-9-]` id for a persona name
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    slug.truncate(MAX_SLUG_LENGTH);
    slug.trim_end_matches('-').to_string()
}
