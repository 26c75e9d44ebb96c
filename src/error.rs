/// Unified error types for the Newsdesk console backend
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the console
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Missing or malformed request fields
    #[error("{0}")]
    Validation(String),

    /// No session identity on a gated route
    #[error("{0}")]
    Unauthorized(String),

    /// Session present but role insufficient
    #[error("{0}")]
    Forbidden(String),

    /// Token or invite lookup miss. Unknown, expired, and already-used
    /// tokens are indistinguishable to the caller.
    #[error("Invalid or expired token")]
    NotFoundOrExpired,

    /// Duplicate email
    #[error("{0}")]
    Conflict(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Wire error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(rename = "redirectTo", skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

/// Convert ConsoleError to HTTP response
impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        let mut redirect_to = None;

        let (status, error_code, message) = match &self {
            ConsoleError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "InvalidRequest", self.to_string())
            }
            ConsoleError::Unauthorized(_) => {
                redirect_to = Some("/login".to_string());
                (StatusCode::UNAUTHORIZED, "Unauthorized", self.to_string())
            }
            ConsoleError::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden", self.to_string()),
            ConsoleError::NotFoundOrExpired => {
                (StatusCode::BAD_REQUEST, "NotFoundOrExpired", self.to_string())
            }
            // Duplicate email surfaces as a plain 400 on this API
            ConsoleError::Conflict(_) => (StatusCode::BAD_REQUEST, "Conflict", self.to_string()),
            ConsoleError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalServerError",
                    "Internal server error".to_string(), // Don't leak details
                )
            }
            ConsoleError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalServerError",
                    "Internal server error".to_string(),
                )
            }
            ConsoleError::Io(e) => {
                tracing::error!("IO error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalServerError",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            redirect_to,
        });

        (status, body).into_response()
    }
}

/// Result type alias for console operations
pub type ConsoleResult<T> = Result<T, ConsoleError>;

impl ConsoleError {
    /// True when the underlying database error is a unique-constraint
    /// violation. Invite redemption relies on this to detect a lost race.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            ConsoleError::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}
