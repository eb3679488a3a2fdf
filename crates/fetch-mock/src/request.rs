//! Request Shapes and URL Normalization
//!
//! Every URL is normalized before it is stored or compared, so that
//! `http://example.com` and `http://EXAMPLE.com/` refer to the same resource.

use crate::result::{FetchMockError, FetchMockResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

/// Base used to resolve relative URLs; only path and query survive.
const RELATIVE_BASE: &str = "http://dummy";

/// HTTP methods for request matching
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HttpMethod {
    /// GET request
    #[default]
    Get,
    /// POST request
    Post,
    /// PUT request
    Put,
    /// DELETE request
    Delete,
    /// PATCH request
    Patch,
    /// HEAD request
    Head,
    /// OPTIONS request
    Options,
    /// Any method
    Any,
    /// Any other method, upper-cased; matches only itself
    Other(String),
}

impl HttpMethod {
    /// Parse from string; `*` maps to [`HttpMethod::Any`], unknown methods
    /// to [`HttpMethod::Other`]
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        let upper = s.to_uppercase();
        match upper.as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "PATCH" => Self::Patch,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            "*" => Self::Any,
            _ => Self::Other(upper),
        }
    }

    /// Convert to string
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Any => "*",
            Self::Other(method) => method,
        }
    }

    /// Check if this method matches another
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        matches!(self, Self::Any) || matches!(other, Self::Any) || self == other
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options a request was made with (the second half of a fetch call)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOptions {
    /// HTTP method
    pub method: HttpMethod,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body
    pub body: Option<Vec<u8>>,
}

impl RequestOptions {
    /// Create options for a GET request
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the method
    #[must_use]
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Set body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set JSON body
    pub fn with_json<T: Serialize>(mut self, data: &T) -> FetchMockResult<Self> {
        self.body = Some(serde_json::to_vec(data)?);
        self.headers
            .insert("content-type".to_string(), "application/json".to_string());
        Ok(self)
    }

    /// Look up a header, ignoring the case of its name
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Get body as string
    #[must_use]
    pub fn body_string(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).to_string())
    }

    /// Parse body as JSON
    pub fn body_json<T: for<'de> Deserialize<'de>>(&self) -> FetchMockResult<T> {
        let body = self
            .body
            .as_ref()
            .ok_or_else(|| FetchMockError::assertion("No request body"))?;
        Ok(serde_json::from_slice(body)?)
    }
}

impl From<HttpMethod> for RequestOptions {
    fn from(method: HttpMethod) -> Self {
        Self::new().with_method(method)
    }
}

fn is_absolute(url: &str) -> bool {
    url.split_once("://").is_some_and(|(scheme, _)| {
        !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphabetic())
    })
}

/// Parse an absolute or relative URL; relative URLs resolve against a dummy origin
pub(crate) fn parse_url(url: &str) -> Option<Url> {
    if is_absolute(url) {
        Url::parse(url).ok()
    } else {
        Url::parse(RELATIVE_BASE).and_then(|base| base.join(url)).ok()
    }
}

/// Canonicalize a URL for equality comparison.
///
/// Absolute URLs are re-serialized (lower-case scheme and host, `/` path on a
/// bare origin). Relative URLs become `path?query`. Unparsable input is
/// returned unchanged.
#[must_use]
pub fn normalize_url(url: &str) -> String {
    if is_absolute(url) {
        return Url::parse(url).map_or_else(|_| url.to_string(), |u| u.to_string());
    }
    match parse_url(url) {
        Some(parsed) => match parsed.query() {
            Some(query) => format!("{}?{}", parsed.path(), query),
            None => parsed.path().to_string(),
        },
        None => url.to_string(),
    }
}
