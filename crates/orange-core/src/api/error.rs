use thiserror::Error;

use crate::auth::StorageError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not logged in - no access token available")]
    Unauthenticated,

    #[error("Authorization rejected (status {status}): {body}")]
    AuthRejected { status: u16, body: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error (status {status}): {body}")]
    Server { status: u16, body: String },

    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Credential storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to read upload {path}: {source}")]
    Upload {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let status = status.as_u16();
        let body = Self::truncate_body(body);
        match status {
            401 | 403 => ApiError::AuthRejected { status, body },
            404 => ApiError::NotFound(body),
            500..=599 => ApiError::Server { status, body },
            _ => ApiError::UnexpectedStatus { status, body },
        }
    }

    /// True for 401/403 responses
    pub fn is_auth_rejected(&self) -> bool {
        matches!(self, ApiError::AuthRejected { .. })
    }
}
