//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Message used when a failure carries no message of its own.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Code used when a failure carries no code of its own.
pub const UNKNOWN_ERROR_CODE: &str = "unknown_error";

/// API error type.
///
/// Every variant resolves to a final response: the HTTP status is carried
/// out-of-band and the body is always `{ "message": .., "code": .. }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - the endpoint requires a session and there is none.
    #[error("unauthorized")]
    Unauthorized,

    /// No billing secret key is configured or available.
    #[error("missing secret key: {code} - {message}")]
    MissingSecretKey {
        /// Message from the credential source, or the generic default.
        message: String,
        /// Code from the credential source, or the generic default.
        code: String,
    },

    /// The request body does not have the shape the endpoint declares.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// The billing handler returned an error status.
    #[error("billing error: {status} {code} - {message}")]
    Handler {
        /// Status code returned by the handler.
        status: u16,
        /// Handler-supplied message.
        message: String,
        /// Handler-supplied code.
        code: String,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Build a handler error, falling back to the generic message and code.
    #[must_use]
    pub fn handler(status: u16, message: Option<String>, code: Option<String>) -> Self {
        Self::Handler {
            status,
            message: message.unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string()),
            code: code.unwrap_or_else(|| UNKNOWN_ERROR_CODE.to_string()),
        }
    }

    /// The HTTP status this error is surfaced with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MissingSecretKey { .. } | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Handler { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, code) = match self {
            Self::Unauthorized => ("Unauthorized".to_string(), "unauthorized".to_string()),
            Self::MissingSecretKey { message, code } | Self::Handler { message, code, .. } => {
                (message, code)
            }
            Self::InvalidBody(msg) => (msg, "invalid_body".to_string()),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    "An internal error occurred".to_string(),
                    "internal_error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { message, code })).into_response()
    }
}
