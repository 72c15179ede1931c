//! Tracker error types with HTTP status code mapping.
//!
//! [`TrackerError`] is the single error type crossing the service boundary.
//! Each variant belongs to a coarse [`ErrorKind`] and maps to an HTTP status
//! and a structured JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// ```json
/// {
///   "error": {
///     "code": 2002,
///     "kind": "not_found",
///     "message": "animal not found: 6f0c…"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code, kind and message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Coarse error category.
    pub kind: ErrorKind,
    /// Human-readable error message.
    pub message: String,
}

/// Coarse error taxonomy exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Observation or animal absent, or not owned by the caller.
    NotFound,
    /// Entity invariant violated (negative weight, malformed date, …).
    ValidationError,
    /// Request shape rejected (empty comparison set, foreign animal, …).
    InvalidInput,
    /// Store or other server-side failure.
    InternalError,
}

/// Service error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category   | HTTP Status               |
/// |-----------|------------|---------------------------|
/// | 1000–1999 | Validation | 400 Bad Request / 401     |
/// | 2000–2999 | Not Found  | 404 Not Found             |
/// | 3000–3999 | Server     | 500 Internal Server Error |
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// Observation absent or owned by someone else.
    #[error("observation not found: {0}")]
    ObservationNotFound(uuid::Uuid),

    /// Animal absent or owned by someone else.
    #[error("animal not found: {0}")]
    AnimalNotFound(uuid::Uuid),

    /// Entity invariant violated.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Request shape rejected.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Caller identity missing or malformed at the transport boundary.
    #[error("missing or invalid owner: {0}")]
    MissingOwner(String),

    /// Store failure, surfaced opaquely.
    #[error("storage error: {0}")]
    Storage(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TrackerError {
    /// Returns the coarse category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ObservationNotFound(_) | Self::AnimalNotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::InvalidInput(_) | Self::MissingOwner(_) => ErrorKind::InvalidInput,
            Self::Storage(_) | Self::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::InvalidInput(_) => 1002,
            Self::MissingOwner(_) => 1003,
            Self::ObservationNotFound(_) => 2001,
            Self::AnimalNotFound(_) => 2002,
            Self::Internal(_) => 3000,
            Self::Storage(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::MissingOwner(_) => StatusCode::UNAUTHORIZED,
            Self::ObservationNotFound(_) | Self::AnimalNotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for TrackerError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                kind: self.kind(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
