//! API Error Handling
//!
//! Unified error type and conversion for API responses. Every error body is
//! an `ErrorBody` carrying a machine-readable `kind`.

use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use studio_core::domain::job::ErrorKind;
use studio_core::dto::response::ErrorBody;
use studio_core::validation::ValidationError;
use uuid::Uuid;

use crate::ledger::LedgerError;
use crate::service::CoordinatorError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    Invalid(ValidationError),
    PayloadTooLarge(String),
    NotFound(String),
    EngineFailure {
        job_id: Option<Uuid>,
        message: String,
    },
    Exhausted(String),
    InvalidTransition(String),
}

impl ApiError {
    pub fn bad_request(field: &str, message: impl Into<String>) -> Self {
        ApiError::Invalid(ValidationError::single(field, message))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Invalid(err) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: err.to_string(),
                    kind: ErrorKind::ValidationError,
                    fields: err.fields,
                    job_id: None,
                },
            ),
            ApiError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                body(msg, ErrorKind::ValidationError),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, body(msg, ErrorKind::NotFound)),
            ApiError::EngineFailure { job_id, message } => (
                StatusCode::BAD_GATEWAY,
                ErrorBody {
                    error: message,
                    kind: ErrorKind::EngineFailure,
                    fields: Vec::new(),
                    job_id,
                },
            ),
            ApiError::Exhausted(msg) => {
                tracing::warn!("Resource exhausted: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    body(msg, ErrorKind::ResourceExhausted),
                )
            }
            ApiError::InvalidTransition(msg) => {
                tracing::error!("Invalid job transition: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    body(
                        "Internal server error".to_string(),
                        ErrorKind::InvalidTransition,
                    ),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

fn body(error: String, kind: ErrorKind) -> ErrorBody {
    ErrorBody {
        error,
        kind,
        fields: Vec::new(),
        job_id: None,
    }
}

impl From<CoordinatorError> for ApiError {
    fn from(err: CoordinatorError) -> Self {
        match err {
            CoordinatorError::Validation(e) => ApiError::Invalid(e),
            CoordinatorError::Ledger(e) => e.into(),
            CoordinatorError::EngineFailure { job_id, message, .. } => {
                ApiError::EngineFailure { job_id, message }
            }
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(id) => ApiError::NotFound(format!("Job {} not found", id)),
            LedgerError::ResourceExhausted(msg) => ApiError::Exhausted(msg),
            e @ LedgerError::InvalidTransition { .. } => ApiError::InvalidTransition(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Invalid(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request("body", rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request("job_id", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request("mode", rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::bad_request("body", rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::bad_request("body", err.body_text())
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
