use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Extension, Json};
use persona_storage::{Persona, VoiceProfile};
use schemars::JsonSchema;
use serde::Serialize;

use crate::{
    middleware::ClientApiKey,
    persona::{BuiltinStyle, NewPersona, PersonaCatalog, PersonaMarketplaceEntry},
    types::{AppError, ValidatedJson},
};

/// A builtin persona as offered in the style picker
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuiltinPersonaResponse {
    /// Value to send as `style`
    pub style: BuiltinStyle,
    /// Short description
    pub description: String,
    /// Text-to-speech settings
    pub voice: Option<VoiceProfile>,
}

/// Response after saving a custom persona
#[derive(Debug, Serialize, JsonSchema)]
pub struct CreatePersonaResponse {
    /// Id to send as `persona`
    pub id: String,
}

/// List builtin personas
///
/// Returns the builtin styles, default first.
pub async fn list_builtins(
    Extension(catalog): Extension<Arc<PersonaCatalog>>,
) -> Json<Vec<BuiltinPersonaResponse>> {
    let personas = catalog
        .list_builtins()
        .await
        .into_iter()
        .map(|style| {
            let persona = style.persona();
            BuiltinPersonaResponse {
                style,
                description: persona.description,
                voice: persona.voice,
            }
        })
        .collect();

    Json(personas)
}

/// List custom personas
///
/// Returns the name and description of every stored custom persona, sorted by
/// name. Unreadable records are left out.
///
/// # Errors
///
/// Returns `500 INTERNAL_SERVER_ERROR` if the persona store cannot be read
pub async fn marketplace(
    Extension(catalog): Extension<Arc<PersonaCatalog>>,
) -> Result<Json<Vec<PersonaMarketplaceEntry>>, AppError> {
    Ok(Json(catalog.list_custom_concurrently().await?))
}

/// Get a custom persona
///
/// # Errors
///
/// Returns an error if:
/// - `400 BAD_REQUEST` - Malformed persona id
/// - `401 UNAUTHORIZED` - Missing or unknown `X-API-KEY`
/// - `404 NOT_FOUND` - No persona with this id
/// - `500 INTERNAL_SERVER_ERROR` - Persona store failure
pub async fn get_custom(
    _api_key: ClientApiKey,
    Extension(catalog): Extension<Arc<PersonaCatalog>>,
    Path(id): Path<String>,
) -> Result<Json<Persona>, AppError> {
    Ok(Json(catalog.load_custom(&id).await?))
}

/// Upload a custom persona
///
/// The persona id is derived from its name; uploading a persona with the same
/// name again replaces it.
///
/// # Returns
///
/// Returns `201 CREATED` with the assigned id
///
/// # Errors
///
/// Returns an error if:
/// - `400 BAD_REQUEST` - Missing name or description, or invalid payload
/// - `401 UNAUTHORIZED` - Missing or unknown `X-API-KEY`
/// - `500 INTERNAL_SERVER_ERROR` - Persona store failure
pub async fn upload(
    _api_key: ClientApiKey,
    Extension(catalog): Extension<Arc<PersonaCatalog>>,
    ValidatedJson(payload): ValidatedJson<NewPersona>,
) -> Result<(StatusCode, Json<CreatePersonaResponse>), AppError> {
    let persona = catalog.save(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatePersonaResponse { id: persona.id }),
    ))
}
