//! Route Definitions and Compilation
//!
//! A [`RouteConfig`] is what a test registers; [`RouteConfig::compile`] turns
//! it into a [`Route`] with a ready-to-run predicate. The same predicate
//! builder backs `filter_calls_with_route`, which compiles a throwaway route
//! from a matcher and [`RouteOptions`] to narrow down recorded calls.

use crate::matcher::{CompiledMatcher, Matcher};
use crate::request::{parse_url, HttpMethod, RequestOptions};
use crate::response::MockResponse;
use crate::result::{FetchMockError, FetchMockResult};
use std::collections::HashMap;

/// Extra request criteria layered on top of a URL matcher
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteOptions {
    /// Required method (`None` = any)
    pub method: Option<HttpMethod>,
    /// Headers that must be present with these values (names are case-insensitive)
    pub headers: HashMap<String, String>,
    /// Query parameters that must be present with these values
    pub query: HashMap<String, String>,
}

impl RouteOptions {
    /// Create empty options (match everything)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a method
    #[must_use]
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Require a header value
    #[must_use]
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Require a query parameter value
    #[must_use]
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.insert(key.to_string(), value.to_string());
        self
    }
}

/// A bare method string is shorthand for `{ method }`
impl From<&str> for RouteOptions {
    fn from(method: &str) -> Self {
        Self::new().with_method(HttpMethod::from_str(method))
    }
}

impl From<HttpMethod> for RouteOptions {
    fn from(method: HttpMethod) -> Self {
        Self::new().with_method(method)
    }
}

/// Compiled test for `(normalized_url, options)` pairs
#[derive(Clone)]
pub(crate) struct RoutePredicate {
    url: CompiledMatcher,
    options: RouteOptions,
}

impl RoutePredicate {
    pub(crate) fn new(matcher: &Matcher, options: &RouteOptions) -> Self {
        Self {
            url: matcher.compile(),
            options: options.clone(),
        }
    }

    pub(crate) fn matches(&self, url: &str, request: &RequestOptions) -> bool {
        if let Some(method) = &self.options.method {
            if !method.matches(&request.method) {
                return false;
            }
        }

        let headers_match = self
            .options
            .headers
            .iter()
            .all(|(key, value)| request.header(key) == Some(value.as_str()));
        if !headers_match {
            return false;
        }

        if !self.options.query.is_empty() {
            let Some(parsed) = parse_url(url) else {
                return false;
            };
            let pairs: HashMap<String, String> = parsed.query_pairs().into_owned().collect();
            let query_match = self
                .options
                .query
                .iter()
                .all(|(key, value)| pairs.get(key) == Some(value));
            if !query_match {
                return false;
            }
        }

        self.url.matches(url, request)
    }
}

impl std::fmt::Debug for RoutePredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutePredicate")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Route configuration, before compilation
#[derive(Debug, Clone)]
pub struct RouteConfig {
    /// Route name (defaults to the matcher's string form)
    pub name: Option<String>,
    /// URL matcher
    pub matcher: Matcher,
    /// Method, header and query criteria
    pub options: RouteOptions,
    /// Number of calls the route expects (checked by `done`)
    pub repeat: Option<usize>,
    /// Response to return
    pub response: Option<MockResponse>,
}

impl RouteConfig {
    /// Create a config for a matcher
    #[must_use]
    pub fn new(matcher: impl Into<Matcher>) -> Self {
        Self {
            name: None,
            matcher: matcher.into(),
            options: RouteOptions::new(),
            repeat: None,
            response: None,
        }
    }

    /// Set the route name
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Require a method
    #[must_use]
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.options.method = Some(method);
        self
    }

    /// Require a header value
    #[must_use]
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.options = self.options.with_header(key, value);
        self
    }

    /// Require a query parameter value
    #[must_use]
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.options = self.options.with_query(key, value);
        self
    }

    /// Replace all options
    #[must_use]
    pub fn with_options(mut self, options: RouteOptions) -> Self {
        self.options = options;
        self
    }

    /// Expect the route to be called `n` times
    #[must_use]
    pub const fn with_repeat(mut self, n: usize) -> Self {
        self.repeat = Some(n);
        self
    }

    /// Set the response
    #[must_use]
    pub fn with_response(mut self, response: MockResponse) -> Self {
        self.response = Some(response);
        self
    }

    /// Compile into a [`Route`]
    pub fn compile(self) -> FetchMockResult<Route> {
        let matcher = self.matcher.normalized();
        let name = self.name.unwrap_or_else(|| matcher.to_string());
        let response = self
            .response
            .ok_or_else(|| FetchMockError::MissingResponse { route: name.clone() })?;
        let predicate = RoutePredicate::new(&matcher, &self.options);

        Ok(Route {
            name,
            matcher,
            method: self.options.method,
            repeat: self.repeat,
            response,
            predicate,
        })
    }
}

/// A compiled, registered route
#[derive(Debug, Clone)]
pub struct Route {
    /// Route name
    pub name: String,
    /// Normalized matcher; stored on every call this route serves
    pub matcher: Matcher,
    /// Configured method, if any
    pub method: Option<HttpMethod>,
    /// Expected number of calls
    pub repeat: Option<usize>,
    /// Response to return
    pub response: MockResponse,
    predicate: RoutePredicate,
}

impl Route {
    /// Check whether a normalized URL and its options hit this route
    #[must_use]
    pub fn matches(&self, url: &str, options: &RequestOptions) -> bool {
        self.predicate.matches(url, options)
    }
}
