use std::collections::BTreeMap;

use persona_storage::{Persona, VoiceProfile};
use schemars::JsonSchema;
use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Description, voice template, English overrides and voice of a builtin
type Template = (
    &'static str,
    &'static str,
    &'static [(&'static str, &'static str)],
    VoiceProfile,
);

/// Personas shipped with the service, selected by the `style` field
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    JsonSchema,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum BuiltinStyle {
    /// Henk from the Jordaan, Amsterdam
    #[default]
    Jordanees,
    /// Henk from Antwerpen
    Belg,
    /// Henk from Brabant
    Brabander,
}

impl BuiltinStyle {
    /// Parses a style, falling back to the default persona for anything unknown
    #[must_use]
    pub fn from_style(style: &str) -> Self {
        style.trim().parse().unwrap_or_else(|_| {
            tracing::debug!(style, "Unknown style, using default persona");
            Self::default()
        })
    }

    /// Full persona definition for this style
    #[must_use]
    pub fn persona(self) -> Persona {
        let (description, system_prompt, english, voice): Template = match self {
            Self::Jordanees => (
                "Amsterdamse volksbuurt charme",
                "Je bent Henk, een Amsterdammer van 58 uit de Jordaan met een grote bek. \
                 Je bent geboren boven een bruin café aan de Lindengracht, je kent iedere brug \
                 bij naam en je hebt over alles een mening, vooral over toeristen op huurfietsen.",
                &[
                    (
                        "een Amsterdammer van 58 uit de Jordaan met een grote bek",
                        "a 58-year-old Amsterdammer from the Jordaan with a big mouth",
                    ),
                    (
                        "Je bent geboren boven een bruin café aan de Lindengracht, je kent iedere brug bij naam en je hebt over alles een mening, vooral over toeristen op huurfietsen.",
                        "You were born above a brown café on the Lindengracht, you know every bridge by name and you have an opinion on everything, especially tourists on rental bikes.",
                    ),
                ],
                VoiceProfile {
                    pitch: 1.0,
                    speech_rate: 1.0,
                },
            ),
            Self::Belg => (
                "Melancholisch maar grappig",
                "Je bent Henk, een vrolijke Belg uit Antwerpen met een zachte G.",
                &[(
                    "een vrolijke Belg uit Antwerpen met een zachte G",
                    "a cheerful Belg from Antwerpen with a soft G",
                )],
                VoiceProfile {
                    pitch: 1.1,
                    speech_rate: 0.95,
                },
            ),
            Self::Brabander => (
                "Gezellige Brabantse humor",
                "Je bent Henk, een gemoedelijke Brabander die met een zachte G praat.",
                &[(
                    "een gemoedelijke Brabander die met een zachte G praat",
                    "an easygoing Brabander who talks with a soft G",
                )],
                VoiceProfile {
                    pitch: 0.9,
                    speech_rate: 1.05,
                },
            ),
        };

        let english: BTreeMap<String, String> = english
            .iter()
            .map(|(from, to)| ((*from).to_string(), (*to).to_string()))
            .collect();

        Persona {
            id: self.as_ref().to_lowercase(),
            name: self.to_string(),
            description: description.to_string(),
            system_prompt: system_prompt.to_string(),
            language_overrides: BTreeMap::from([("en".to_string(), english)]),
            voice: Some(voice),
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_from_style() {
        assert_eq!(BuiltinStyle::from_style("Belg"), BuiltinStyle::Belg);
        assert_eq!(BuiltinStyle::from_style("brabander"), BuiltinStyle::Brabander);
        assert_eq!(BuiltinStyle::from_style(" JORDANEES "), BuiltinStyle::Jordanees);
    }

    #[test]
    fn test_unknown_style_is_default() {
        assert_eq!(BuiltinStyle::from_style("Rotterdammer"), BuiltinStyle::Jordanees);
        assert_eq!(BuiltinStyle::from_style(""), BuiltinStyle::Jordanees);
    }

    #[test]
    fn test_personas_carry_regional_tokens() {
        let jordanees = BuiltinStyle::Jordanees.persona();
        assert_eq!(jordanees.id, "jordanees");
        assert!(jordanees.system_prompt.contains("Jordaan"));

        let belg = BuiltinStyle::Belg.persona();
        assert_eq!(belg.name, "Belg");
        assert!(belg.system_prompt.contains("Antwerpen"));

        let brabander = BuiltinStyle::Brabander.persona();
        assert!(brabander.system_prompt.contains("zachte G"));
    }

    #[test]
    fn test_english_overrides_match_system_prompt() {
        // Overrides only work if their keys occur verbatim in the template
        for style in BuiltinStyle::iter() {
            let persona = style.persona();
            for from in persona.language_overrides["en"].keys() {
                assert!(
                    persona.system_prompt.contains(from.as_str()),
                    "{style}: {from:?} not in system prompt"
                );
            }
        }
    }

    #[test]
    fn test_default_is_long_form() {
        let default = BuiltinStyle::default().persona();
        for style in [BuiltinStyle::Belg, BuiltinStyle::Brabander] {
            assert!(default.system_prompt.len() > style.persona().system_prompt.len());
        }
    }
}
