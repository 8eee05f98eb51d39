//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use tickethub_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Structured details, e.g. `{"remaining": 3}` on capacity and
    /// headcount rejections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// HTTP-facing wrapper around [`AppError`].
///
/// `AppError` lives in `tickethub-core` and cannot implement axum's
/// `IntoResponse` itself; handlers return this wrapper and `?` converts
/// through the `From` impl.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = match &err.kind {
            ErrorKind::Validation | ErrorKind::TicketTypeMismatch => StatusCode::BAD_REQUEST,
            ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
            ErrorKind::Authorization => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict
            | ErrorKind::CapacityExceeded
            | ErrorKind::PartialOverflow
            | ErrorKind::AlreadyFullyUsed
            | ErrorKind::SessionMismatch => StatusCode::CONFLICT,
            ErrorKind::Internal
            | ErrorKind::Database
            | ErrorKind::Configuration
            | ErrorKind::Mail
            | ErrorKind::Serialization => {
                tracing::error!(error = %err.message, kind = %err.kind, "Internal server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ApiErrorResponse {
            error: err.kind.to_string(),
            message: err.message.clone(),
            details: err.details.clone(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_exceeded_maps_to_conflict_with_details() {
        let response = ApiError::from(AppError::capacity_exceeded(2)).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = ApiError::from(AppError::not_found("nope")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
