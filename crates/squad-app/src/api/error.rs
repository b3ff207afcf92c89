// Errors returned by the backend client.

use serde::Deserialize;
use thiserror::Error;

use super::wire::SchemaError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 401: the token is missing, invalid or expired.
    #[error("session expired: {0}")]
    Unauthorized(String),

    /// 403: authenticated but not allowed, e.g. team updates are locked.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response from server: {0}")]
    Decode(String),
}

impl From<SchemaError> for ApiError {
    fn from(e: SchemaError) -> Self {
        ApiError::Decode(e.to_string())
    }
}

/// Backend error bodies carry `message`, sometimes `error`, sometimes both.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// The human-readable part of an error body, if it has one.
pub(crate) fn body_message(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    parsed
        .message
        .or(parsed.error)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

impl ApiError {
    /// Classify a non-success response.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let message =
            body_message(body).unwrap_or_else(|| format!("request failed with status {status}"));
        match status {
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            _ => ApiError::Backend { status, message },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}
