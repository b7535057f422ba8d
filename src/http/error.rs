//! API client error types

use crate::session::SessionError;
use thiserror::Error;

/// Errors that can occur when talking to the marketplace API
#[derive(Error, Debug)]
pub enum ApiError {
    /// 401: the token is missing, expired or revoked. The session has been cleared.
    #[error("Session expired, please log in again")]
    Unauthorized,

    /// 403: the token is valid but not allowed here. The session has been cleared.
    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Request timeout")]
    Timeout,

    #[error("API unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Session store error: {0}")]
    Session(#[from] SessionError),
}

impl ApiError {
    /// Whether the caller should send the user back to the login screen
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::Unauthorized | ApiError::Forbidden(_))
    }

    /// HTTP status carried by this error, if it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_connect() {
            ApiError::Unavailable
        } else {
            ApiError::Request(e)
        }
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Pull a human-readable message out of an error body.
///
/// The backend answers with `{"message": ...}` or `{"error": ...}`; anything
/// else is passed through as text.
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    body.trim().to_string()
}
