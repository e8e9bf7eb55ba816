use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use userdir_core::storage::RepositoryError;

/// Handler-level error taxonomy.
///
/// Every handler failure is one of these tags; the `IntoResponse` impl is
/// the single translator from tag to status code and `{"message": ...}`
/// body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    /// Carries the internal detail for the log; clients only ever see a
    /// generic message.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal error");
                "Internal server error.".to_string()
            }
            ApiError::BadRequest(msg) | ApiError::Unauthorized(msg) | ApiError::NotFound(msg) => {
                msg
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => ApiError::NotFound("User not found.".to_string()),
            // A conditional-write conflict is the authoritative duplicate
            // signal and maps to the same outcome as the pre-check.
            RepositoryError::AlreadyExists { .. } => {
                ApiError::BadRequest("Email already exists.".to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}
