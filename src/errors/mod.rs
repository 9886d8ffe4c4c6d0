//! Error handling module for the PageSync backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.
//! Every failure that reaches the dashboard carries a machine-readable code and a readable
//! message; upstream failures are never retried.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const INVALID_URL: &str = "INVALID_URL";
    pub const UPSTREAM_FETCH_ERROR: &str = "UPSTREAM_FETCH_ERROR";
    pub const REPOSITORY_NOT_FOUND: &str = "REPOSITORY_NOT_FOUND";
    pub const BRANCH_NOT_FOUND: &str = "BRANCH_NOT_FOUND";
    pub const GITHUB_ERROR: &str = "GITHUB_ERROR";
    pub const GITHUB_INVALID_TOKEN: &str = "GITHUB_INVALID_TOKEN";
    pub const GITHUB_FORBIDDEN: &str = "GITHUB_FORBIDDEN";
    pub const GITHUB_NOT_FOUND: &str = "GITHUB_NOT_FOUND";
    pub const GITHUB_WRITE_FAILED: &str = "GITHUB_WRITE_FAILED";
    pub const PERSISTENCE_ERROR: &str = "PERSISTENCE_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
}

/// Why a GitHub contents write was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFailure {
    /// 401: the token is invalid or expired
    InvalidCredential,
    /// 403: the token lacks the contents write scope
    InsufficientScope,
    /// 404: repository or path not found
    NotFound,
    /// Any other upstream status
    Upstream,
}

impl WriteFailure {
    /// Classify a GitHub response status.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => WriteFailure::InvalidCredential,
            403 => WriteFailure::InsufficientScope,
            404 => WriteFailure::NotFound,
            _ => WriteFailure::Upstream,
        }
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Dashboard authentication required
    Unauthorized(String),
    /// Resource not found
    NotFound(String),
    /// Missing or malformed required input
    Validation(String),
    /// A URL that does not parse as an absolute URL
    InvalidUrl(String),
    /// Non-success status (or transport failure) from a page or sitemap origin
    UpstreamFetch {
        status: Option<u16>,
        message: String,
    },
    /// Repository metadata could not be resolved
    RepositoryNotFound(String),
    /// Branch could not be resolved
    BranchNotFound(String),
    /// Other GitHub read failures (tree listing)
    GitHub { status: Option<u16>, message: String },
    /// GitHub rejected a contents write
    GitHubWrite {
        failure: WriteFailure,
        status: u16,
        message: String,
    },
    /// Datastore operation failed
    Persistence(String),
    /// Internal server error
    Internal(String),
    /// Bad request
    BadRequest(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamFetch { .. } => StatusCode::BAD_GATEWAY,
            AppError::RepositoryNotFound(_) => StatusCode::NOT_FOUND,
            AppError::BranchNotFound(_) => StatusCode::NOT_FOUND,
            AppError::GitHub { .. } => StatusCode::BAD_GATEWAY,
            AppError::GitHubWrite { .. } => StatusCode::BAD_GATEWAY,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::InvalidUrl(_) => codes::INVALID_URL,
            AppError::UpstreamFetch { .. } => codes::UPSTREAM_FETCH_ERROR,
            AppError::RepositoryNotFound(_) => codes::REPOSITORY_NOT_FOUND,
            AppError::BranchNotFound(_) => codes::BRANCH_NOT_FOUND,
            AppError::GitHub { .. } => codes::GITHUB_ERROR,
            AppError::GitHubWrite { failure, .. } => match failure {
                WriteFailure::InvalidCredential => codes::GITHUB_INVALID_TOKEN,
                WriteFailure::InsufficientScope => codes::GITHUB_FORBIDDEN,
                WriteFailure::NotFound => codes::GITHUB_NOT_FOUND,
                WriteFailure::Upstream => codes::GITHUB_WRITE_FAILED,
            },
            AppError::Persistence(_) => codes::PERSISTENCE_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::InvalidUrl(msg) => msg.clone(),
            AppError::UpstreamFetch { message, .. } => message.clone(),
            AppError::RepositoryNotFound(msg) => msg.clone(),
            AppError::BranchNotFound(msg) => msg.clone(),
            AppError::GitHub { message, .. } => message.clone(),
            AppError::GitHubWrite { message, .. } => message.clone(),
            AppError::Persistence(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
        }
    }

    /// Status reported by the upstream service, if the error came from one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            AppError::UpstreamFetch { status, .. } => *status,
            AppError::GitHub { status, .. } => *status,
            AppError::GitHubWrite { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Persistence(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::BadRequest(format!("JSON error: {}", err))
    }
}

/// Error details in the response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&AppError> for ErrorDetails {
    fn from(error: &AppError) -> Self {
        let details = error
            .upstream_status()
            .map(|status| serde_json::json!({ "upstreamStatus": status }));

        Self {
            code: error.error_code().to_string(),
            message: error.message(),
            details,
        }
    }
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
    pub revision_id: i64,
}

impl ErrorResponse {
    pub fn new(error: &AppError, revision_id: i64) -> Self {
        Self {
            success: false,
            error: ErrorDetails::from(error),
            revision_id,
        }
    }
}

/// Wrapper type for errors that carry revision_id context.
pub struct AppErrorWithRevision {
    pub error: AppError,
    pub revision_id: i64,
}

impl IntoResponse for AppErrorWithRevision {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let body = ErrorResponse::new(&self.error, self.revision_id);
        (status, Json(body)).into_response()
    }
}
