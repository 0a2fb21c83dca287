//! Application error taxonomy and its HTTP mapping.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::repository::RepoError;

/// AppError
///
/// Every failure a handler can surface. Authentication (401) and authorization (403)
/// failures are separate variants so clients can tell "log in again" apart from
/// "you lack permission".
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed input, duplicate unique field or dangling reference.
    #[error("{0}")]
    Validation(String),

    /// Missing, malformed, expired or badly signed bearer token; bad credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Valid token whose roles do not intersect the operation's allow-list.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// The entity still has dependents and the delete is restricted.
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Repository(#[from] RepoError),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(entity: &str) -> Self {
        AppError::NotFound(format!("{entity} not found"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Repository(err) if err.is_constraint_violation() => StatusCode::BAD_REQUEST,
            AppError::Repository(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let detail = match &self {
            AppError::Repository(err) if err.is_constraint_violation() => {
                tracing::warn!(error = %err, "constraint violation");
                "The request conflicts with a database constraint.".to_string()
            }
            AppError::Repository(err) => {
                // Storage details stay in the logs.
                tracing::error!(error = ?err, "repository failure");
                "Internal server error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}
