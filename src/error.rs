//! Error types for the API client
//!
//! Every failure a caller can observe is an [`ApiError`]. Network and HTTP
//! failures are folded into [`NormalizedError`] by the response pipeline
//! before they leave the client.

use std::fmt;

use thiserror::Error;

// == Normalized Error ==
/// Uniform failure shape for anything that went wrong on the wire.
///
/// `status_code` is present whenever a response was received, whatever the
/// reason for the failure (non-2xx status, malformed body).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedError {
    /// Human-readable message
    pub message: String,
    /// HTTP status code, if a response arrived
    pub status_code: Option<u16>,
}

impl NormalizedError {
    /// Creates a new NormalizedError.
    pub fn new(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self {
            message: message.into(),
            status_code,
        }
    }
}

impl fmt::Display for NormalizedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(status) => write!(f, "{} (status {})", self.message, status),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for NormalizedError {}

// == Api Error Enum ==
/// Unified error type for the API client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Network or HTTP failure, already normalized
    #[error(transparent)]
    Normalized(#[from] NormalizedError),

    /// Payload rejected by the caller's validator or not decodable into the requested type
    #[error("invalid data format: {0}")]
    Format(String),

    /// Call aborted through its cancellation token
    #[error("request cancelled")]
    Cancelled,

    /// Query parameters or body could not be encoded
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Client could not be constructed
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Returns the HTTP status code carried by a normalized failure.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Normalized(err) => err.status_code,
            _ => None,
        }
    }

    /// Returns true if the call was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

// == Result Type Alias ==
/// Convenience Result type for the API client.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_display_with_status() {
        let err = NormalizedError::new("bad input", Some(422));
        assert_eq!(err.to_string(), "bad input (status 422)");
    }

    #[test]
    fn test_normalized_display_without_status() {
        let err = NormalizedError::new("connection refused", None);
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn test_status_code_accessor() {
        let err: ApiError = NormalizedError::new("missing", Some(404)).into();
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(ApiError::Cancelled.status_code(), None);
        assert_eq!(ApiError::Format("x".into()).status_code(), None);
    }

    #[test]
    fn test_is_cancelled() {
        assert!(ApiError::Cancelled.is_cancelled());
        assert!(!ApiError::Format("not an array".into()).is_cancelled());
    }
}
