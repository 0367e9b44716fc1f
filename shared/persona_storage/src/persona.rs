use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{PersonaStorageError, PersonaStorageResult};

/// Maximum length of a persona id
const MAX_ID_LENGTH: usize = 64;

/// Voice settings the mobile text-to-speech player applies for a persona
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoiceProfile {
    /// Relative pitch, `1.0` is the device default
    pub pitch: f32,
    /// Relative speech rate, `1.0` is the device default
    pub speech_rate: f32,
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self {
            pitch: 1.0,
            speech_rate: 1.0,
        }
    }
}

/// A persona definition: who is talking and how they sound.
///
/// Stored records only need `name` and `description`; everything else is
/// optional so hand-written marketplace files stay valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    /// Unique persona identifier, also the storage key
    #[serde(default)]
    pub id: String,
    /// Display name
    pub name: String,
    /// Public description shown in the marketplace
    pub description: String,
    /// Voice/tone template opening every prompt, also sent as the system message
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub system_prompt: String,
    /// Per-language literal substitutions applied to composed prompts
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub language_overrides: BTreeMap<String, BTreeMap<String, String>>,
    /// Optional text-to-speech settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<VoiceProfile>,
}

impl Persona {
    /// Parses a stored record, forcing its `id` to the key it was stored under.
    ///
    /// # Errors
    ///
    /// Returns `PersonaStorageError::Malformed` if `raw` is not a valid persona record
    pub fn from_record(id: &str, raw: &str) -> PersonaStorageResult<Self> {
        let mut persona: Self =
            serde_json::from_str(raw).map_err(|source| PersonaStorageError::Malformed {
                id: id.to_string(),
                source,
            })?;
        persona.id = id.to_string();
        Ok(persona)
    }

    /// Serializes the persona into its stored record form
    ///
    /// # Errors
    ///
    /// Returns `PersonaStorageError::SerializationError` if serialization fails
    pub fn to_record(&self) -> PersonaStorageResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PersonaStorageError::SerializationError(e.to_string()))
    }
}

/// Checks that `id` is usable as a storage key.
///
/// Ids are restricted to `[a-z0-9_-]` so a key can never address anything
/// outside the persona collection.
///
/// # Errors
///
/// Returns `PersonaStorageError::InvalidId` if the id is empty, too long or
/// contains other characters
pub fn validate_id(id: &str) -> PersonaStorageResult<()> {
    let valid = !id.is_empty()
        && id.len() <= MAX_ID_LENGTH
        && id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_');

    if valid {
        Ok(())
    } else {
        Err(PersonaStorageError::InvalidId(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_record_minimal_fields() {
        let persona =
            Persona::from_record("piraat", r#"{"name": "Piraat", "description": "Arrr"}"#)
                .unwrap();

        assert_eq!(persona.id, "piraat");
        assert_eq!(persona.name, "Piraat");
        assert!(persona.system_prompt.is_empty());
        assert!(persona.language_overrides.is_empty());
        assert!(persona.voice.is_none());
    }

    #[test]
    fn test_from_record_overrides_stored_id() {
        let persona = Persona::from_record(
            "actual-key",
            r#"{"id": "something-else", "name": "X", "description": "Y"}"#,
        )
        .unwrap();
        assert_eq!(persona.id, "actual-key");
    }

    #[test]
    fn test_from_record_rich_fields() {
        let raw = r#"{
            "name": "Rotterdammer",
            "description": "Niet lullen maar poetsen",
            "systemPrompt": "Je bent Kees uit Rotterdam-Zuid.",
            "languageOverrides": {"en": {"Kees": "Case"}},
            "voice": {"pitch": 0.8, "speechRate": 1.2}
        }"#;
        let persona = Persona::from_record("rotterdammer", raw).unwrap();

        assert_eq!(persona.system_prompt, "Je bent Kees uit Rotterdam-Zuid.");
        assert_eq!(persona.language_overrides["en"]["Kees"], "Case");
        assert_eq!(
            persona.voice,
            Some(VoiceProfile {
                pitch: 0.8,
                speech_rate: 1.2
            })
        );
    }

    #[test]
    fn test_from_record_missing_description_is_malformed() {
        let result = Persona::from_record("broken", r#"{"name": "Only a name"}"#);
        assert!(matches!(
            result,
            Err(PersonaStorageError::Malformed { ref id, .. }) if id == "broken"
        ));
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("jordanees").is_ok());
        assert!(validate_id("rotterdam-zuid_2").is_ok());

        assert!(validate_id("").is_err());
        assert!(validate_id("../etc/passwd").is_err());
        assert!(validate_id("Upper").is_err());
        assert!(validate_id("with space").is_err());
        assert!(validate_id(&"a".repeat(65)).is_err());
    }
}
