//! Error types for API adapters.

use thiserror::Error;

/// Errors that can occur when talking to the monitoring API.
///
/// Cloneable so a single failed request can be reported to every caller
/// that was waiting on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The API signalled rate limiting (HTTP 429).
    #[error("Rate limited by monitoring API")]
    RateLimited,

    /// The API answered with a non-success status.
    #[error("API returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// HTTP request failed for another reason.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Client could not be configured.
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RateLimited => Some(429),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited)
    }

    /// Whether the failure is transient and worth retrying.
    ///
    /// Retryable: 429, 502, 503, timeouts and connection failures. Every
    /// other status (validation, not found, other 5xx) and parse errors fail
    /// permanently.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::RateLimited | ApiError::Timeout | ApiError::Connection(_) => true,
            ApiError::Status { status, .. } => matches!(status, 429 | 502 | 503),
            ApiError::Parse(_) | ApiError::Http(_) | ApiError::Config(_) => false,
        }
    }

    /// Build an error from an HTTP status and response body.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        if status == 429 {
            ApiError::RateLimited
        } else {
            ApiError::Status {
                status,
                message: message.into(),
            }
        }
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Connection(err.to_string())
        } else if err.is_decode() {
            ApiError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::from_status(status.as_u16(), err.to_string())
        } else {
            ApiError::Http(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        assert!(ApiError::from_status(429, "").is_retryable());
        assert!(ApiError::from_status(502, "bad gateway").is_retryable());
        assert!(ApiError::from_status(503, "unavailable").is_retryable());
        assert!(!ApiError::from_status(500, "boom").is_retryable());
        assert!(!ApiError::from_status(404, "missing").is_retryable());
        assert!(!ApiError::from_status(422, "invalid").is_retryable());
    }

    #[test]
    fn test_transient_network_errors_are_retryable() {
        assert!(ApiError::Timeout.is_retryable());
        assert!(ApiError::Connection("refused".into()).is_retryable());
        assert!(!ApiError::Parse("eof".into()).is_retryable());
    }

    #[test]
    fn test_from_status_maps_429() {
        let err = ApiError::from_status(429, "slow down");
        assert!(err.is_rate_limited());
        assert_eq!(err.status(), Some(429));
    }
}
