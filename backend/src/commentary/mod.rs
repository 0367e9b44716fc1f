//! The location-to-commentary pipeline.
//!
//! `resolve place -> pick persona -> compose prompt -> generate remark`, with
//! remarks cached per rounded coordinate. Apart from coordinate validation
//! nothing here fails: every stage absorbs its own upstream errors into a
//! fallback. A remark is only cached when no stage fell back, so a passing
//! outage is never served again from the cache.

mod error;

use std::sync::Arc;
use std::time::Duration;

use persona_storage::Persona;
use tracing::instrument;

pub use error::CommentaryError;

use crate::cache::CacheManager;
use crate::generator::{Commentary, CommentaryGenerator, CommentarySource};
use crate::persona::{BuiltinStyle, PersonaCatalog};
use crate::place::{Coordinate, PlaceResolver};
use crate::prompt::{compose, system_message, Language};
use crate::types::AppConfig;

/// Decimal places coordinates are rounded to for caching (about 100 m)
const CACHE_COORDINATE_PRECISION: f64 = 1_000.0;

/// One request for a remark
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentaryRequest {
    /// Latitude in degrees, required
    pub lat: Option<f64>,
    /// Longitude in degrees, required
    pub lon: Option<f64>,
    /// Question from the user; blank counts as none
    pub question: Option<String>,
    /// Builtin style, also the fallback when `persona` cannot be loaded
    pub style: Option<String>,
    /// Custom persona id
    pub persona: Option<String>,
    /// Output language, Dutch when absent
    pub language: Option<Language>,
}

impl CommentaryRequest {
    fn coordinate(&self) -> Result<Coordinate, CommentaryError> {
        let (Some(lat), Some(lon)) = (self.lat, self.lon) else {
            return Err(CommentaryError::MissingCoordinates);
        };

        let in_range = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        if !in_range {
            return Err(CommentaryError::CoordinatesOutOfRange { lat, lon });
        }

        Ok(Coordinate {
            latitude: lat,
            longitude: lon,
        })
    }

    fn question(&self) -> Option<&str> {
        self.question
            .as_deref()
            .map(str::trim)
            .filter(|question| !question.is_empty())
    }

    fn custom_persona_id(&self) -> Option<&str> {
        self.persona
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    fn style(&self) -> BuiltinStyle {
        self.style
            .as_deref()
            .map(BuiltinStyle::from_style)
            .unwrap_or_default()
    }
}

/// Persona selection as it takes part in the cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PersonaKey {
    Builtin(BuiltinStyle),
    Custom {
        id: String,
        fallback: BuiltinStyle,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    lat: i64,
    lon: i64,
    persona: PersonaKey,
    question: Option<String>,
    language: Language,
}

impl CacheKey {
    #[allow(clippy::cast_possible_truncation)]
    fn new(coordinate: Coordinate, request: &CommentaryRequest, language: Language) -> Self {
        let round = |degrees: f64| (degrees * CACHE_COORDINATE_PRECISION).round() as i64;
        let persona = match request.custom_persona_id() {
            Some(id) => PersonaKey::Custom {
                id: id.to_string(),
                fallback: request.style(),
            },
            None => PersonaKey::Builtin(request.style()),
        };

        Self {
            lat: round(coordinate.latitude),
            lon: round(coordinate.longitude),
            persona,
            question: request.question().map(ToString::to_string),
            language,
        }
    }
}

/// Persona picked for one request
struct PersonaChoice {
    persona: Persona,
    /// The requested custom persona could not be loaded
    fell_back: bool,
}

/// Produces one persona-voiced remark for a coordinate
pub struct CommentaryPipeline {
    resolver: PlaceResolver,
    catalog: Arc<PersonaCatalog>,
    generator: CommentaryGenerator,
    cache: CacheManager<CacheKey, String>,
    cache_ttl: Duration,
}

impl CommentaryPipeline {
    /// Creates a pipeline with an empty remark cache sized from `config`
    #[must_use]
    pub fn new(
        resolver: PlaceResolver,
        catalog: Arc<PersonaCatalog>,
        generator: CommentaryGenerator,
        config: &AppConfig,
    ) -> Self {
        Self {
            resolver,
            catalog,
            generator,
            cache: CacheManager::new(config.comment_cache_capacity),
            cache_ttl: config.comment_cache_ttl,
        }
    }

    /// Produces a remark for the request.
    ///
    /// # Errors
    ///
    /// - `CommentaryError::MissingCoordinates` - `lat` or `lon` is absent
    /// - `CommentaryError::CoordinatesOutOfRange` - `lat` or `lon` is not a valid position
    #[instrument(skip_all, fields(lat = ?request.lat, lon = ?request.lon, style = ?request.style, persona = ?request.persona))]
    pub async fn handle(&self, request: &CommentaryRequest) -> Result<Commentary, CommentaryError> {
        let coordinate = request.coordinate()?;
        let language = request.language.unwrap_or_default();
        let key = CacheKey::new(coordinate, request, language);

        if let Some(text) = self.cache.get(&key).await {
            tracing::debug!("Serving cached remark");
            return Ok(Commentary {
                text,
                source: CommentarySource::Generated,
            });
        }

        let place = self.resolver.resolve(coordinate).await;
        let choice = self.select_persona(request).await;
        let prompt = compose(&place.extract, request.question(), &choice.persona, language);
        let commentary = self
            .generator
            .generate(&prompt, &system_message(&choice.persona, language))
            .await;

        let degraded = commentary.is_fallback() || place.is_unavailable() || choice.fell_back;
        if degraded {
            tracing::debug!(
                place_unavailable = place.is_unavailable(),
                persona_fell_back = choice.fell_back,
                generator_fell_back = commentary.is_fallback(),
                "Not caching degraded remark"
            );
        } else {
            self.cache
                .insert(key, commentary.text.clone(), self.cache_ttl)
                .await;
        }

        Ok(commentary)
    }

    async fn select_persona(&self, request: &CommentaryRequest) -> PersonaChoice {
        let style = request.style();
        let Some(id) = request.custom_persona_id() else {
            return PersonaChoice {
                persona: style.persona(),
                fell_back: false,
            };
        };

        match self.catalog.load_custom(id).await {
            Ok(persona) => PersonaChoice {
                persona,
                fell_back: false,
            },
            Err(e) => {
                tracing::warn!(persona = id, error = %e, "Custom persona unavailable, using builtin style");
                PersonaChoice {
                    persona: style.persona(),
                    fell_back: true,
                }
            }
        }
    }
}
