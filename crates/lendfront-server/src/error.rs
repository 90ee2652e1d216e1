//! HTTP error types for the lendfront server.
//!
//! Maps domain errors from `lendfront-core` into HTTP responses. Every error
//! variant produces a JSON body with a machine-readable `error` field and a
//! human-readable `message`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use lendfront_core::error::{AdminError, LeadError, StoreError, UploadError};

/// Application-level error returned from HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// The settings store has not finished hydrating.
    NotReady,
    /// Wrong admin password.
    Unauthorized(String),
    /// Requested resource not found.
    NotFound(String),
    /// Client sent invalid input.
    BadRequest(String),
    /// An upstream service (the notification webhook) failed.
    BadGateway(String),
    /// Internal server error.
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            Self::NotReady => (
                StatusCode::SERVICE_UNAVAILABLE,
                "not_ready",
                "settings are still loading".to_owned(),
            ),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "bad_gateway", msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: error_type,
            message,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotReady => Self::NotReady,
            StoreError::InvalidValue { .. } => Self::BadRequest(err.to_string()),
            StoreError::Encode { .. } | StoreError::Storage(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<AdminError> for AppError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Storage(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Empty
            | UploadError::UnsupportedType { .. }
            | UploadError::TooLarge { .. }
            | UploadError::Decode { .. } => Self::BadRequest(err.to_string()),
            UploadError::Store { .. } => Self::Internal(err.to_string()),
        }
    }
}

impl From<LeadError> for AppError {
    fn from(err: LeadError) -> Self {
        match err {
            LeadError::MissingField { .. } => Self::BadRequest(err.to_string()),
            LeadError::NotConfigured { .. } => Self::Internal(err.to_string()),
            LeadError::Webhook { .. } | LeadError::Rejected { .. } => Self::BadGateway(err.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn error_body_shape() {
        let response = AppError::from(StoreError::NotReady).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "not_ready");
    }

    #[test]
    fn upload_policy_errors_are_client_errors() {
        let err = AppError::from(UploadError::TooLarge { size: 11, limit: 10 });
        assert!(matches!(err, AppError::BadRequest(_)));
        let err = AppError::from(LeadError::MissingField { field: "name" });
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
