use std::sync::Arc;

use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    commentary::{CommentaryPipeline, CommentaryRequest},
    middleware::ClientApiKey,
    prompt::Language,
    types::{AppError, ValidatedJson},
};

/// Request for a remark about the current location
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct CommentRequest {
    /// Latitude in degrees
    pub lat: Option<f64>,

    /// Longitude in degrees
    pub lon: Option<f64>,

    /// Question asked by the user; empty means no question
    #[validate(length(max = 500, message = "Question must be at most 500 characters"))]
    pub question: Option<String>,

    /// Builtin persona style (`Jordanees`, `Belg`, `Brabander`); unknown styles use `Jordanees`
    #[validate(length(max = 64, message = "Style must be at most 64 characters"))]
    pub style: Option<String>,

    /// Custom persona id; falls back to `style` when it cannot be loaded
    #[validate(length(max = 64, message = "Persona must be at most 64 characters"))]
    pub persona: Option<String>,

    /// Output language, `nl` when absent
    pub language: Option<Language>,
}

impl From<CommentRequest> for CommentaryRequest {
    fn from(request: CommentRequest) -> Self {
        Self {
            lat: request.lat,
            lon: request.lon,
            question: request.question,
            style: request.style,
            persona: request.persona,
            language: request.language,
        }
    }
}

/// Remark to be spoken by the client
#[derive(Debug, Serialize, JsonSchema)]
pub struct CommentResponse {
    /// The remark
    pub text: String,
}

/// Generate a remark about a location
///
/// Looks up the nearest notable place, then lets the selected persona say
/// something about it. Upstream failures do not fail the request: the
/// persona answers with a fixed line instead.
///
/// # Returns
///
/// Returns `200 OK` with the remark
///
/// # Errors
///
/// Returns an error if:
/// - `400 BAD_REQUEST` - `lat`/`lon` missing or out of range, or invalid payload
/// - `401 UNAUTHORIZED` - Missing or unknown `X-API-KEY`
pub async fn handler(
    _api_key: ClientApiKey,
    Extension(pipeline): Extension<Arc<CommentaryPipeline>>,
    ValidatedJson(payload): ValidatedJson<CommentRequest>,
) -> Result<Json<CommentResponse>, AppError> {
    let request = CommentaryRequest::from(payload);
    let commentary = pipeline.handle(&request).await?;

    Ok(Json(CommentResponse {
        text: commentary.text,
    }))
}
