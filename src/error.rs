//! Error taxonomy for the monitoring engine.

use fleetwatch_adapters::ApiError;
use thiserror::Error;

/// Errors surfaced by the monitoring engine.
///
/// Every variant is cloneable: one failed fetch is reported to all callers
/// that were waiting on it, and the last error is kept next to the cached
/// data so views can render it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MonitorError {
    /// The API kept rate limiting us after all retries were spent.
    #[error("Rate limit exceeded after {attempts} attempts")]
    RateLimit { attempts: u32 },

    /// Generic network or API failure.
    #[error("Fetch failed: {0}")]
    Fetch(#[from] ApiError),

    /// Malformed input to a filter or query call.
    #[error("Invalid query: {0}")]
    Validation(String),
}

impl MonitorError {
    /// Stable error code for display and logs.
    pub fn code(&self) -> &'static str {
        match self {
            MonitorError::RateLimit { .. } => "RATE_LIMIT_ERROR",
            MonitorError::Fetch(_) => "FETCH_ERROR",
            MonitorError::Validation(_) => "VALIDATION_ERROR",
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        MonitorError::Validation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(MonitorError::RateLimit { attempts: 4 }.code(), "RATE_LIMIT_ERROR");
        assert_eq!(MonitorError::from(ApiError::Timeout).code(), "FETCH_ERROR");
        assert_eq!(MonitorError::validation("bad").code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_display() {
        let err = MonitorError::RateLimit { attempts: 4 };
        assert_eq!(err.to_string(), "Rate limit exceeded after 4 attempts");
    }
}
