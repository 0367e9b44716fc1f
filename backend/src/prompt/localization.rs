//! Surface localization of composed prompts.
//!
//! This is a literal token swap, not translation. The fixed sentences the
//! composer writes are replaced, plus whatever a persona lists in its
//! `languageOverrides`. Replacement runs over the whole composed prompt, so a
//! place summary or question that happens to contain one of these fragments
//! (say "Je bent") is rewritten as well. Coverage is partial and best effort.

use persona_storage::Persona;

use super::Language;

/// Dutch fragments emitted by the composer and their English counterparts.
///
/// Longer fragments come before the shorter ones they contain.
const DUTCH_TO_ENGLISH: &[(&str, &str)] = &[
    (
        "Je praat graag over cultuur en hebt altijd een grappige opmerking.",
        "You love talking about culture and always have a funny remark.",
    ),
    (
        "Geef één humoristische zin over deze plek.",
        "Give one humorous sentence about this place.",
    ),
    ("Samenvatting van de plek:", "Summary of the place:"),
    ("Iemand vraagt je:", "Someone asks you:"),
    ("Wat zeg je?", "What do you say?"),
    ("Je bent", "You are"),
];

/// Rewrites the composer's fixed Dutch phrases for `language`.
///
/// The persona's own overrides for the language are applied first so their
/// keys still match the untouched template text.
#[must_use]
pub fn apply_surface_localization(text: &str, persona: &Persona, language: Language) -> String {
    let mut localized = text.to_string();

    if let Some(overrides) = persona.language_overrides.get(language.as_ref()) {
        for (from, to) in overrides.iter().filter(|(from, _)| !from.is_empty()) {
            localized = localized.replace(from.as_str(), to);
        }
    }

    if language == Language::En {
        for (from, to) in DUTCH_TO_ENGLISH {
            localized = localized.replace(from, to);
        }
    }

    localized
}
