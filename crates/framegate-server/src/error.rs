//! HTTP error surface for the gateway API.
//!
//! Every failure leaving a handler is mapped to exactly one status code and
//! one machine-readable `error_code` before crossing the boundary: 400 for
//! schema validation (listing every invalid field), 502 for anything the
//! provider side caused, 500 for gateway misconfiguration. No raw error
//! detail crosses unclassified.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use framegate_core::{KeyframeError, ProviderFailure, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Provider(#[from] ProviderFailure),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<KeyframeError> for ApiError {
    fn from(err: KeyframeError) -> Self {
        ApiError::Provider(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(err) => {
                let body = json!({
                    "error_code": "ValidationError",
                    "detail": err.to_string(),
                    "fields": err.fields,
                });
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::Provider(failure) => {
                tracing::error!(
                    classification = ?failure.classification,
                    detail = %failure.detail,
                    "provider-side failure"
                );
                let body = json!({
                    "error_code": failure.classification,
                    "detail": failure.detail,
                });
                (StatusCode::BAD_GATEWAY, Json(body)).into_response()
            }
            ApiError::Configuration(detail) => {
                tracing::error!(detail = %detail, "gateway misconfiguration");
                let body = json!({
                    "error_code": "Configuration",
                    "detail": detail,
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framegate_core::ErrorClassification;

    #[test]
    fn test_provider_failure_encodes_classification_as_error_code() {
        let failure = ProviderFailure::new(
            ErrorClassification::UnsupportedCapability,
            "lastFrame not supported",
        );
        let response = ApiError::from(failure).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_validation_error_maps_to_bad_request() {
        let err = ValidationError::single("start_frame", "is required");
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
