use std::sync::Arc;

use aide::OperationIo;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};

use crate::types::{AppConfig, AppError};

/// Header carrying the client API key
pub const API_KEY_HEADER: &str = "x-api-key";

const MISSING_API_KEY: AppError = AppError::new(
    StatusCode::UNAUTHORIZED,
    "missing_api_key",
    "API key is required",
    false,
);

const INVALID_API_KEY: AppError = AppError::new(
    StatusCode::UNAUTHORIZED,
    "invalid_api_key",
    "API key is invalid",
    false,
);

/// Proof that the request carried an accepted `X-API-KEY` header
///
/// Add it to a handler's arguments to gate the route:
/// ```ignore
/// async fn gated_handler(
///     _api_key: ClientApiKey,
///     // ... other extractors
/// ) -> Result<impl IntoApiResponse, AppError> {
///     Ok("Gated content")
/// }
/// ```
///
/// When no client keys are configured the gate is open and every request passes.
#[derive(Debug, Clone, OperationIo)]
pub struct ClientApiKey;

impl<S> FromRequestParts<S> for ClientApiKey
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let config = parts
            .extensions
            .get::<Arc<AppConfig>>()
            .cloned()
            .ok_or_else(|| {
                tracing::error!("AppConfig extension missing, rejecting request");
                AppError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                    false,
                )
            })?;

        if config.client_api_keys.is_empty() {
            return Ok(Self);
        }

        let provided = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(MISSING_API_KEY)?;

        if config.client_api_keys.iter().any(|key| key == provided) {
            Ok(Self)
        } else {
            Err(INVALID_API_KEY)
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with(keys: &[&str], header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/comment");
        if let Some(value) = header {
            builder = builder.header(API_KEY_HEADER, value);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        parts.extensions.insert(Arc::new(AppConfig {
            client_api_keys: keys.iter().map(ToString::to_string).collect(),
            ..AppConfig::default()
        }));
        parts
    }

    #[tokio::test]
    async fn test_open_gate_without_configured_keys() {
        let mut parts = parts_with(&[], None);
        assert!(ClientApiKey::from_request_parts(&mut parts, &()).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_key() {
        let mut parts = parts_with(&["secret"], None);
        let err = ClientApiKey::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.code(), "missing_api_key");
    }

    #[tokio::test]
    async fn test_wrong_key() {
        let mut parts = parts_with(&["secret"], Some("guess"));
        let err = ClientApiKey::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_api_key");
    }

    #[tokio::test]
    async fn test_any_configured_key_is_accepted() {
        let mut parts = parts_with(&["old", "new"], Some("new"));
        assert!(ClientApiKey::from_request_parts(&mut parts, &()).await.is_ok());
    }
}
