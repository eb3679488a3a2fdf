//! Recorded calls.

use crate::matcher::Matcher;
use crate::request::RequestOptions;
use crate::route::Route;

/// One intercepted request and how it was resolved
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    /// Requested URL, normalized
    pub url: String,
    /// Request options
    pub options: RequestOptions,
    /// Name of the route that served the call
    pub name: Option<String>,
    /// Normalized matcher of the route that served the call
    pub matcher: Option<Matcher>,
    /// No route matched the call
    pub unmatched: bool,
}

impl CallRecord {
    /// Record a call served by `route`
    #[must_use]
    pub fn matched(url: &str, options: RequestOptions, route: &Route) -> Self {
        Self {
            url: url.to_string(),
            options,
            name: Some(route.name.clone()),
            matcher: Some(route.matcher.clone()),
            unmatched: false,
        }
    }

    /// Record a call no route matched
    #[must_use]
    pub fn unmatched(url: &str, options: RequestOptions) -> Self {
        Self {
            url: url.to_string(),
            options,
            name: None,
            matcher: None,
            unmatched: true,
        }
    }

    /// The `(url, options)` pair
    #[must_use]
    pub fn as_pair(&self) -> (&str, &RequestOptions) {
        (&self.url, &self.options)
    }
}
