//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use osbridge_executor::ExecutorError;
use serde::Serialize;

/// OSB error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error: String,
    /// Human-readable error message.
    pub description: String,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

impl ApiError {
    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingParameter(_) => "missing_parameter",
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::Internal(_) => "internal_error",
            Self::Executor(e) => e.kind(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_) => StatusCode::BAD_REQUEST,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Executor(e) => match e {
                ExecutorError::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
                ExecutorError::InstanceNotFound(_) => StatusCode::NOT_FOUND,
                ExecutorError::AuthenticationFailed => StatusCode::UNAUTHORIZED,
                ExecutorError::DownstreamRejected(_)
                | ExecutorError::TransportFailure(_)
                | ExecutorError::ShapeMismatch(_)
                | ExecutorError::CredentialNotFound(_) => StatusCode::BAD_GATEWAY,
                ExecutorError::BindingsRemain(_) | ExecutorError::Config(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.code(), "Request failed");
        }
        let body = ErrorResponse {
            error: self.code().to_string(),
            description: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
