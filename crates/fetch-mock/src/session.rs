//! Mock Session
//!
//! [`FetchMock`] owns everything a test's mocking session needs: the
//! registered routes, the call log, the holding queue and configuration.
//! Inspection methods live in [`crate::inspect`].

use crate::call::CallRecord;
use crate::config::FetchMockConfig;
use crate::holding::HoldingQueue;
use crate::matcher::Matcher;
use crate::request::{normalize_url, HttpMethod, RequestOptions};
use crate::response::MockResponse;
use crate::result::FetchMockResult;
use crate::route::{Route, RouteConfig};
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A fetch mocking session
#[derive(Debug, Default)]
pub struct FetchMock {
    config: FetchMockConfig,
    routes: Vec<Route>,
    calls: Mutex<Vec<CallRecord>>,
    holding: HoldingQueue,
}

impl FetchMock {
    /// Create a session with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with the given configuration
    #[must_use]
    pub fn with_config(config: FetchMockConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Session configuration
    #[must_use]
    pub const fn config(&self) -> &FetchMockConfig {
        &self.config
    }

    /// Compile and register a route
    pub fn route(&mut self, config: RouteConfig) -> FetchMockResult<&mut Self> {
        let route = config.compile()?;
        tracing::debug!(route = %route.name, matcher = %route.matcher, "route registered");
        self.routes.push(route);
        Ok(self)
    }

    /// Register a route matching any method
    pub fn mock(
        &mut self,
        matcher: impl Into<Matcher>,
        response: MockResponse,
    ) -> FetchMockResult<&mut Self> {
        self.route(RouteConfig::new(matcher).with_response(response))
    }

    fn method_route(
        &mut self,
        method: HttpMethod,
        matcher: impl Into<Matcher>,
        response: MockResponse,
    ) -> FetchMockResult<&mut Self> {
        self.route(
            RouteConfig::new(matcher)
                .with_method(method)
                .with_response(response),
        )
    }

    /// Register a GET route
    pub fn get(
        &mut self,
        matcher: impl Into<Matcher>,
        response: MockResponse,
    ) -> FetchMockResult<&mut Self> {
        self.method_route(HttpMethod::Get, matcher, response)
    }

    /// Register a POST route
    pub fn post(
        &mut self,
        matcher: impl Into<Matcher>,
        response: MockResponse,
    ) -> FetchMockResult<&mut Self> {
        self.method_route(HttpMethod::Post, matcher, response)
    }

    /// Register a PUT route
    pub fn put(
        &mut self,
        matcher: impl Into<Matcher>,
        response: MockResponse,
    ) -> FetchMockResult<&mut Self> {
        self.method_route(HttpMethod::Put, matcher, response)
    }

    /// Register a DELETE route
    pub fn delete(
        &mut self,
        matcher: impl Into<Matcher>,
        response: MockResponse,
    ) -> FetchMockResult<&mut Self> {
        self.method_route(HttpMethod::Delete, matcher, response)
    }

    /// Registered routes, in registration order
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Get route count
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    fn log(&self) -> MutexGuard<'_, Vec<CallRecord>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Intercept a call: record it and return the response of the first
    /// matching route, or the configured fallback when nothing matches.
    pub fn handle(&self, url: &str, options: RequestOptions) -> Option<MockResponse> {
        let url = normalize_url(url);

        if let Some(route) = self.routes.iter().find(|r| r.matches(&url, &options)) {
            tracing::debug!(
                route = %route.name,
                url = %url,
                method = %options.method,
                "call matched"
            );
            self.log().push(CallRecord::matched(&url, options, route));
            return Some(route.response.clone());
        }

        if self.config.warn_on_unmatched {
            tracing::warn!(url = %url, method = %options.method, "no route matched");
        }
        self.log().push(CallRecord::unmatched(&url, options));
        self.config.fallback_response.clone()
    }

    /// Snapshot of the call log, in call order
    #[must_use]
    pub fn all_calls(&self) -> Vec<CallRecord> {
        self.log().clone()
    }

    /// Queue a pending response completion for [`FetchMock::flush`]
    pub fn hold<F>(&self, future: F)
    where
        F: Future<Output = FetchMockResult<()>> + Send + 'static,
    {
        self.holding.push(future);
    }

    /// Handle to the holding queue, for dispatchers queueing from elsewhere
    #[must_use]
    pub fn holding(&self) -> HoldingQueue {
        self.holding.clone()
    }

    /// Wait for held response completions to settle.
    ///
    /// See [`HoldingQueue::flush`].
    pub async fn flush(&self, wait_for_response_methods: bool) -> FetchMockResult<()> {
        self.holding.flush(wait_for_response_methods).await
    }

    /// Forget recorded calls and pending completions, keeping routes
    pub fn reset_history(&self) {
        self.log().clear();
        self.holding.clear();
    }

    /// Forget everything, including routes
    pub fn reset(&mut self) {
        self.reset_history();
        self.routes.clear();
    }
}

/// Builder for a [`FetchMock`] session
#[derive(Debug, Default)]
pub struct FetchMockBuilder {
    config: FetchMockConfig,
    routes: Vec<RouteConfig>,
}

impl FetchMockBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set configuration
    #[must_use]
    pub fn config(mut self, config: FetchMockConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a route
    #[must_use]
    pub fn route(mut self, route: RouteConfig) -> Self {
        self.routes.push(route);
        self
    }

    /// Add a GET route
    #[must_use]
    pub fn get(self, matcher: impl Into<Matcher>, response: MockResponse) -> Self {
        self.route(
            RouteConfig::new(matcher)
                .with_method(HttpMethod::Get)
                .with_response(response),
        )
    }

    /// Add a POST route
    #[must_use]
    pub fn post(self, matcher: impl Into<Matcher>, response: MockResponse) -> Self {
        self.route(
            RouteConfig::new(matcher)
                .with_method(HttpMethod::Post)
                .with_response(response),
        )
    }

    /// Build the session, compiling every route
    pub fn build(self) -> FetchMockResult<FetchMock> {
        let mut mock = FetchMock::with_config(self.config);
        for route in self.routes {
            mock.route(route)?;
        }
        Ok(mock)
    }
}
