//! Universal error handling for the API

use std::borrow::Cow;

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use persona_storage::PersonaStorageError;
use schemars::JsonSchema;
use serde::Serialize;

use crate::commentary::CommentaryError;
use crate::persona::PersonaCatalogError;

/// API error response envelope that matches mobile client expectations
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Whether the client should retry the request
    pub allow_retry: bool,
    /// Error details
    error: ErrorBody,
}

/// Error body containing code and message
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    /// Machine-readable error code
    pub code: &'static str,
    /// Human-readable error message
    pub message: Cow<'static, str>,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub const fn new(
        status: StatusCode,
        code: &'static str,
        msg: &'static str,
        retry: bool,
    ) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                allow_retry: retry,
                error: ErrorBody {
                    code,
                    message: Cow::Borrowed(msg),
                },
            },
        }
    }

    /// Create a `400 BAD_REQUEST` validation error with a message built at runtime
    #[must_use]
    pub fn validation(code: &'static str, msg: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            inner: ApiErrorResponse {
                allow_retry: false,
                error: ErrorBody {
                    code,
                    message: msg.into(),
                },
            },
        }
    }

    /// HTTP status of the error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.inner.error.code
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Convert pipeline validation errors to application errors
impl From<CommentaryError> for AppError {
    fn from(err: CommentaryError) -> Self {
        match err {
            CommentaryError::MissingCoordinates => Self::new(
                StatusCode::BAD_REQUEST,
                "missing_coordinates",
                "Coordinates are required",
                false,
            ),
            CommentaryError::CoordinatesOutOfRange { .. } => {
                Self::validation("invalid_coordinates", err.to_string())
            }
        }
    }
}

/// Convert persona catalog errors to application errors
impl From<PersonaCatalogError> for AppError {
    fn from(err: PersonaCatalogError) -> Self {
        match err {
            PersonaCatalogError::NotFound(id) => {
                tracing::debug!("Persona not found: {id}");
                Self::new(
                    StatusCode::NOT_FOUND,
                    "persona_not_found",
                    "Persona not found",
                    false,
                )
            }
            PersonaCatalogError::Invalid(msg) => Self::validation("validation_error", msg),
            PersonaCatalogError::Storage(e) => e.into(),
        }
    }
}

/// Convert persona storage errors to application errors
impl From<PersonaStorageError> for AppError {
    fn from(err: PersonaStorageError) -> Self {
        match &err {
            PersonaStorageError::InvalidId(id) => {
                tracing::warn!("Invalid persona id: {id:?}");
                Self::new(
                    StatusCode::BAD_REQUEST,
                    "invalid_persona_id",
                    "Invalid persona id",
                    false,
                )
            }
            PersonaStorageError::Io(_) => {
                tracing::error!("Persona store error: {err}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                    true,
                )
            }
            PersonaStorageError::Malformed { .. } | PersonaStorageError::SerializationError(_) => {
                tracing::error!("Persona record error: {err}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                    false,
                )
            }
        }
    }
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ApiErrorResponse>::operation_response(ctx, operation)
    }
}
