//! Prompt composition for the commentary model.
//!
//! Composition is pure: no I/O, and identical inputs always give the
//! identical prompt.

mod localization;

use std::fmt;

use persona_storage::Persona;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

pub use localization::apply_surface_localization;

const TRANSITION: &str = "Je praat graag over cultuur en hebt altijd een grappige opmerking.";
const SUMMARY_HEADER: &str = "Samenvatting van de plek:";
const HUMOROUS_INSTRUCTION: &str = "Geef één humoristische zin over deze plek.";

/// Output language of a prompt
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Language {
    /// Dutch, the language the templates are written in
    #[default]
    Nl,
    /// English, by surface localization of the Dutch templates
    En,
}

/// A composed prompt, ready to be sent as the user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    /// The prompt text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds the prompt for one remark about a place.
///
/// Layout: persona preamble, transition sentence, summary block, then either
/// the question or the instruction to write one humorous sentence. A blank
/// question counts as no question.
#[must_use]
pub fn compose(
    summary: &str,
    question: Option<&str>,
    persona: &Persona,
    language: Language,
) -> Prompt {
    let mut text = format!(
        "{preamble}\n{TRANSITION}\n\n{SUMMARY_HEADER}\n{summary}\n\n",
        preamble = preamble(persona)
    );

    match question.map(str::trim).filter(|q| !q.is_empty()) {
        Some(question) => text.push_str(&format!("Iemand vraagt je: '{question}'. Wat zeg je?")),
        None => text.push_str(HUMOROUS_INSTRUCTION),
    }

    Prompt(apply_surface_localization(&text, persona, language))
}

/// Short identity line sent as the system message alongside a prompt.
///
/// This is the first sentence of the persona preamble, localized the same way.
#[must_use]
pub fn system_message(persona: &Persona, language: Language) -> String {
    let preamble = preamble(persona);
    let first_sentence = match preamble.find(". ") {
        Some(end) => &preamble[..=end],
        None => preamble.as_str(),
    };

    apply_surface_localization(first_sentence, persona, language)
}

fn preamble(persona: &Persona) -> String {
    let system_prompt = persona.system_prompt.trim();
    if system_prompt.is_empty() {
        format!("Je bent {}. {}", persona.name, persona.description)
    } else {
        system_prompt.to_string()
    }
}
