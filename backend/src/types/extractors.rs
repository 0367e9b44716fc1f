//! Custom extractors for request validation

use aide::operation::OperationInput;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use schemars::JsonSchema;
use validator::Validate;

use crate::types::error::AppError;

/// Custom JSON extractor that validates the payload
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: serde::de::DeserializeOwned + Validate + JsonSchema,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // First extract JSON
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|err| json_rejection(&err))?;

        // Then validate
        payload.validate().map_err(|errors| {
            // Use the first field error carrying a message as the client-facing message
            errors
                .field_errors()
                .values()
                .filter_map(|field_errors| field_errors.first())
                .find_map(|error| error.message.clone())
                .map_or_else(
                    || AppError::validation("validation_error", "Request validation failed"),
                    |message| AppError::validation("validation_error", message),
                )
        })?;

        Ok(Self(payload))
    }
}

/// Maps axum's JSON rejections onto the API error envelope
fn json_rejection(err: &JsonRejection) -> AppError {
    tracing::debug!("JSON rejection: {err}");
    match err {
        JsonRejection::MissingJsonContentType(_) => AppError::new(
            StatusCode::BAD_REQUEST,
            "invalid_content_type",
            "Missing Content-Type: application/json header",
            false,
        ),
        _ => AppError::new(
            StatusCode::BAD_REQUEST,
            "invalid_json",
            "Invalid JSON payload",
            false,
        ),
    }
}

impl<T> OperationInput for ValidatedJson<T>
where
    T: JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        // Delegate to Json<T>'s implementation since ValidatedJson has the same structure
        Json::<T>::operation_input(ctx, operation);
    }
}
