//! Session configuration.

use crate::response::MockResponse;
use crate::result::FetchMockResult;
use serde::{Deserialize, Serialize};

/// Configuration for a [`crate::FetchMock`] session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchMockConfig {
    /// Log a warning for every call no route matched
    pub warn_on_unmatched: bool,
    /// Log a warning for every failed expectation found by `done`
    pub warn_on_done_failure: bool,
    /// Response returned for calls no route matched
    pub fallback_response: Option<MockResponse>,
}

impl Default for FetchMockConfig {
    fn default() -> Self {
        Self {
            warn_on_unmatched: true,
            warn_on_done_failure: true,
            fallback_response: None,
        }
    }
}

impl FetchMockConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> FetchMockResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Toggle unmatched-call warnings
    #[must_use]
    pub const fn with_warn_on_unmatched(mut self, warn: bool) -> Self {
        self.warn_on_unmatched = warn;
        self
    }

    /// Toggle `done` failure warnings
    #[must_use]
    pub const fn with_warn_on_done_failure(mut self, warn: bool) -> Self {
        self.warn_on_done_failure = warn;
        self
    }

    /// Respond to unmatched calls instead of passing them through
    #[must_use]
    pub fn with_fallback_response(mut self, response: MockResponse) -> Self {
        self.fallback_response = Some(response);
        self
    }
}
