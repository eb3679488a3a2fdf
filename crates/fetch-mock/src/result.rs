//! Result and error types for fetch-mock.

use thiserror::Error;

/// Result type for fetch-mock operations
pub type FetchMockResult<T> = Result<T, FetchMockError>;

/// Errors that can occur while configuring or inspecting a mock
#[derive(Debug, Error)]
pub enum FetchMockError {
    /// A matcher pattern could not be compiled
    #[error("Invalid matcher `{pattern}`: {message}")]
    InvalidMatcher {
        /// Offending pattern
        pattern: String,
        /// Error message
        message: String,
    },

    /// A route was registered without a response
    #[error("Route `{route}` has no response configured")]
    MissingResponse {
        /// Route name
        route: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// A held response completion failed while flushing
    #[error("Response failed: {message}")]
    ResponseFailed {
        /// Error message
        message: String,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FetchMockError {
    /// Create an assertion failure
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a response failure, for use by futures queued with `FetchMock::hold`
    pub fn response(message: impl Into<String>) -> Self {
        Self::ResponseFailed {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = FetchMockError::MissingResponse {
            route: "users".to_string(),
        };
        assert_eq!(err.to_string(), "Route `users` has no response configured");

        let err = FetchMockError::assertion("users not called");
        assert_eq!(err.to_string(), "Assertion failed: users not called");

        let err = FetchMockError::response("body stream closed");
        assert_eq!(err.to_string(), "Response failed: body stream closed");
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: FetchMockError = json_err.into();
        assert!(matches!(err, FetchMockError::Json(_)));
    }
}
