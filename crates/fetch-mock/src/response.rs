//! Canned responses returned by routes.

use crate::result::FetchMockResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A mocked HTTP response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Response body
    pub body: Vec<u8>,
    /// Content type
    pub content_type: String,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self {
            status: 200,
            headers: HashMap::new(),
            body: Vec::new(),
            content_type: "application/json".to_string(),
        }
    }
}

impl MockResponse {
    /// Create an empty 200 response
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a JSON response
    pub fn json<T: Serialize>(data: &T) -> FetchMockResult<Self> {
        Ok(Self {
            body: serde_json::to_vec(data)?,
            ..Self::default()
        })
    }

    /// Create a text response
    #[must_use]
    pub fn text(content: &str) -> Self {
        Self {
            body: content.as_bytes().to_vec(),
            content_type: "text/plain".to_string(),
            ..Self::default()
        }
    }

    /// Create an empty response with the given status
    #[must_use]
    pub fn status(status: u16) -> Self {
        Self::new().with_status(status)
    }

    /// Set status code
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Get body as string
    #[must_use]
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}
