use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    dao::storage::StorageError,
    state::{
        lifecycle::InvalidTransition,
        live_match::{CorruptRecord, MatchRuleError},
        sport::UnknownName,
    },
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Missing or wrong operator token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Input rejected before any mutation was applied.
    #[error("invalid input: {0}")]
    Validation(String),
    /// Requested lifecycle move is not in the transition table.
    #[error("{0}")]
    InvalidTransition(#[from] InvalidTransition),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Storage refused the write because it clashes with an existing record.
    #[error("conflict: {0}")]
    Conflict(String),
    /// A persisted record failed structural checks.
    #[error(transparent)]
    Corrupt(#[from] CorruptRecord),
}

impl ServiceError {
    /// Lookup miss for a match id or share code. The message never echoes the key,
    /// so malformed and unknown keys are indistinguishable.
    pub fn match_not_found() -> Self {
        ServiceError::NotFound("match not found".into())
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict { message } => ServiceError::Conflict(message),
            other => ServiceError::Unavailable(other),
        }
    }
}

impl From<MatchRuleError> for ServiceError {
    fn from(err: MatchRuleError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

impl From<UnknownName> for ServiceError {
    fn from(err: UnknownName) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::Unauthorized(message) => AppError::Unauthorized(message),
            ServiceError::Validation(message) => AppError::BadRequest(message),
            ServiceError::InvalidTransition(invalid) => AppError::Conflict(invalid.to_string()),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Conflict(message) => AppError::Conflict(message),
            ServiceError::Corrupt(corrupt) => AppError::Internal(corrupt.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
