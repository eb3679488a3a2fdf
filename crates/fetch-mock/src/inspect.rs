//! Call Inspection
//!
//! Queries over a session's call log, used by test assertions.
//!
//! Every query takes a filter and options:
//!
//! - the filter is resolved once into a [`CallFilter`]: `true` keeps matched
//!   calls, `false` unmatched ones, `()` keeps everything, a string made of
//!   `[0-9a-z-]` names a route and any other string (or a [`Matcher`])
//!   selects the calls served by the route registered with that matcher;
//! - options ([`FilterOptions`]) narrow the result further with a throwaway
//!   route predicate. A bare method string is shorthand for `{ method }`.
//!
//! Results always preserve call order.

use crate::call::CallRecord;
use crate::matcher::Matcher;
use crate::request::{normalize_url, HttpMethod, RequestOptions};
use crate::result::{FetchMockError, FetchMockResult};
use crate::route::{RouteOptions, RoutePredicate};
use crate::session::FetchMock;
use regex::Regex;

/// Selects calls by how they were resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameFilter {
    /// Every call
    All,
    /// Calls some route matched
    Matched,
    /// Calls no route matched
    Unmatched,
    /// Calls served by the named route
    Named(String),
}

impl From<bool> for NameFilter {
    fn from(matched: bool) -> Self {
        if matched {
            Self::Matched
        } else {
            Self::Unmatched
        }
    }
}

impl From<()> for NameFilter {
    fn from((): ()) -> Self {
        Self::All
    }
}

impl From<&str> for NameFilter {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

/// First stage of every query: by route name, or by route matcher
#[derive(Debug, Clone, PartialEq)]
pub enum CallFilter {
    /// Filter by resolution or route name
    Name(NameFilter),
    /// Filter by the matcher the serving route was registered with
    Matcher(Matcher),
}

impl CallFilter {
    /// Whether `s` has the shape of a route name rather than a URL or pattern
    #[must_use]
    pub fn is_route_name(s: &str) -> bool {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase() || c == '-')
    }
}

impl From<NameFilter> for CallFilter {
    fn from(name: NameFilter) -> Self {
        Self::Name(name)
    }
}

impl From<Matcher> for CallFilter {
    fn from(matcher: Matcher) -> Self {
        Self::Matcher(matcher)
    }
}

impl From<Regex> for CallFilter {
    fn from(re: Regex) -> Self {
        Self::Matcher(Matcher::Regex(re))
    }
}

impl From<bool> for CallFilter {
    fn from(matched: bool) -> Self {
        Self::Name(matched.into())
    }
}

impl From<()> for CallFilter {
    fn from((): ()) -> Self {
        Self::Name(NameFilter::All)
    }
}

impl From<&str> for CallFilter {
    fn from(s: &str) -> Self {
        // Left unnormalized so `done` can tell that it names no route.
        if s.is_empty() {
            return Self::Matcher(Matcher::Url(String::new()));
        }
        if Self::is_route_name(s) {
            Self::Name(NameFilter::Named(s.to_string()))
        } else {
            Self::Matcher(Matcher::parse(s))
        }
    }
}

impl From<&String> for CallFilter {
    fn from(s: &String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<String> for CallFilter {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Option<&str>> for CallFilter {
    fn from(s: Option<&str>) -> Self {
        s.map_or(Self::Name(NameFilter::All), Self::from)
    }
}

/// Optional second stage of a query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions(Option<RouteOptions>);

impl FilterOptions {
    /// No further filtering
    #[must_use]
    pub const fn none() -> Self {
        Self(None)
    }

    /// The route options, if any
    #[must_use]
    pub const fn as_route_options(&self) -> Option<&RouteOptions> {
        self.0.as_ref()
    }

    /// Method the options require, if any
    #[must_use]
    pub fn method(&self) -> Option<HttpMethod> {
        self.0.as_ref().and_then(|o| o.method.clone())
    }
}

impl From<()> for FilterOptions {
    fn from((): ()) -> Self {
        Self(None)
    }
}

impl From<&str> for FilterOptions {
    fn from(method: &str) -> Self {
        Self(Some(RouteOptions::from(method)))
    }
}

impl From<HttpMethod> for FilterOptions {
    fn from(method: HttpMethod) -> Self {
        Self(Some(RouteOptions::from(method)))
    }
}

impl From<RouteOptions> for FilterOptions {
    fn from(options: RouteOptions) -> Self {
        Self(Some(options))
    }
}

impl From<Option<RouteOptions>> for FilterOptions {
    fn from(options: Option<RouteOptions>) -> Self {
        Self(options)
    }
}

impl From<Option<HttpMethod>> for FilterOptions {
    fn from(method: Option<HttpMethod>) -> Self {
        Self(method.map(RouteOptions::from))
    }
}

/// Why a route failed its `done` check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DoneFailureKind {
    /// The route was never called
    NotCalled,
    /// The route was called fewer times than its `repeat`
    TooFewCalls {
        /// Calls recorded
        actual: usize,
        /// Calls expected
        expected: usize,
    },
}

/// One unmet expectation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoneFailure {
    /// Route name (or matcher) checked
    pub name: String,
    /// What went wrong
    pub kind: DoneFailureKind,
}

impl std::fmt::Display for DoneFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            DoneFailureKind::NotCalled => write!(f, "{} not called", self.name),
            DoneFailureKind::TooFewCalls { actual, expected } => write!(
                f,
                "{} only called {} times, but {} expected",
                self.name, actual, expected
            ),
        }
    }
}

/// Outcome of reconciling expected against actual calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoneReport {
    /// Every unmet expectation, in route order
    pub failures: Vec<DoneFailure>,
}

impl DoneReport {
    /// True when every expectation was met
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.failures.is_empty()
    }
}

impl std::fmt::Display for DoneReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lines: Vec<String> = self.failures.iter().map(ToString::to_string).collect();
        write!(f, "{}", lines.join("; "))
    }
}

/// A route (or synthetic entry) checked by `done`
struct DoneTarget {
    name: String,
    filter: CallFilter,
    method: Option<HttpMethod>,
}

impl FetchMock {
    /// Calls selected by resolution or route name
    #[must_use]
    pub fn filter_calls_by_name(&self, name: impl Into<NameFilter>) -> Vec<CallRecord> {
        let name: NameFilter = name.into();
        let calls = self.all_calls();
        match name {
            NameFilter::All => calls,
            NameFilter::Matched => calls.into_iter().filter(|c| !c.unmatched).collect(),
            NameFilter::Unmatched => calls.into_iter().filter(|c| c.unmatched).collect(),
            NameFilter::Named(name) => calls
                .into_iter()
                .filter(|c| c.name.as_deref() == Some(name.as_str()))
                .collect(),
        }
    }

    /// Calls served by the route registered with `matcher`.
    ///
    /// `None` when no call carries that matcher, which tells
    /// [`FetchMock::filter_calls`] to fall back to testing the matcher
    /// against the whole log.
    #[must_use]
    pub fn filter_calls_by_matcher(&self, matcher: impl Into<Matcher>) -> Option<Vec<CallRecord>> {
        let matcher = matcher.into().normalized();
        let calls: Vec<CallRecord> = self
            .all_calls()
            .into_iter()
            .filter(|c| c.matcher.as_ref() == Some(&matcher))
            .collect();
        if calls.is_empty() {
            None
        } else {
            Some(calls)
        }
    }

    /// Calls among `calls` (default: the whole log) that a route built from
    /// `matcher` and `options` would match
    #[must_use]
    pub fn filter_calls_with_route(
        &self,
        matcher: impl Into<Matcher>,
        options: &RouteOptions,
        calls: Option<Vec<CallRecord>>,
    ) -> Vec<CallRecord> {
        let predicate = RoutePredicate::new(&matcher.into(), options);
        calls
            .unwrap_or_else(|| self.all_calls())
            .into_iter()
            .filter(|c| {
                let (url, options) = c.as_pair();
                predicate.matches(&normalize_url(url), options)
            })
            .collect()
    }

    /// Calls selected by a filter, narrowed by options
    #[must_use]
    pub fn filter_calls(
        &self,
        filter: impl Into<CallFilter>,
        options: impl Into<FilterOptions>,
    ) -> Vec<CallRecord> {
        let filter: CallFilter = filter.into();
        let options: FilterOptions = options.into();
        let (calls, route_matcher) = match filter {
            CallFilter::Name(name) => (Some(self.filter_calls_by_name(name)), Matcher::Any),
            CallFilter::Matcher(matcher) => (self.filter_calls_by_matcher(matcher.clone()), matcher),
        };

        match options.as_route_options() {
            Some(options) => self.filter_calls_with_route(route_matcher, options, calls),
            None => calls.unwrap_or_default(),
        }
    }

    /// Recorded calls; alias of [`FetchMock::filter_calls`]
    #[must_use]
    pub fn calls(
        &self,
        filter: impl Into<CallFilter>,
        options: impl Into<FilterOptions>,
    ) -> Vec<CallRecord> {
        self.filter_calls(filter, options)
    }

    /// Most recent call selected by a filter
    #[must_use]
    pub fn last_call(
        &self,
        filter: impl Into<CallFilter>,
        options: impl Into<FilterOptions>,
    ) -> Option<CallRecord> {
        self.filter_calls(filter, options).pop()
    }

    /// URL of the most recent call selected by a filter
    #[must_use]
    pub fn last_url(
        &self,
        filter: impl Into<CallFilter>,
        options: impl Into<FilterOptions>,
    ) -> Option<String> {
        self.last_call(filter, options).map(|c| c.url)
    }

    /// Request options of the most recent call selected by a filter
    #[must_use]
    pub fn last_options(
        &self,
        filter: impl Into<CallFilter>,
        options: impl Into<FilterOptions>,
    ) -> Option<RequestOptions> {
        self.last_call(filter, options).map(|c| c.options)
    }

    /// Whether any call is selected by a filter
    #[must_use]
    pub fn called(&self, filter: impl Into<CallFilter>, options: impl Into<FilterOptions>) -> bool {
        !self.filter_calls(filter, options).is_empty()
    }

    /// Reconcile registered expectations with recorded calls.
    ///
    /// A route name or matcher checks that single entry; `true`, `false`,
    /// `()` or an empty string check every registered route. Options override each route's
    /// method. All entries are checked, so the report lists every failure.
    #[must_use]
    pub fn done_report(
        &self,
        filter: impl Into<CallFilter>,
        options: impl Into<FilterOptions>,
    ) -> DoneReport {
        let filter: CallFilter = filter.into();
        let options: FilterOptions = options.into();
        let targets: Vec<DoneTarget> = match filter {
            CallFilter::Name(NameFilter::Named(name)) => vec![DoneTarget {
                filter: CallFilter::Name(NameFilter::Named(name.clone())),
                name,
                method: None,
            }],
            CallFilter::Matcher(Matcher::Url(url)) if url.is_empty() => self.route_targets(),
            CallFilter::Matcher(matcher) => vec![DoneTarget {
                name: matcher.to_string(),
                filter: CallFilter::Matcher(matcher),
                method: None,
            }],
            CallFilter::Name(_) => self.route_targets(),
        };

        let failures = targets
            .into_iter()
            .filter_map(|target| self.check_target(target, &options))
            .collect();
        DoneReport { failures }
    }

    fn route_targets(&self) -> Vec<DoneTarget> {
        self.routes()
            .iter()
            .map(|route| DoneTarget {
                name: route.name.clone(),
                filter: CallFilter::from(route.name.as_str()),
                method: route.method.clone(),
            })
            .collect()
    }

    fn check_target(&self, target: DoneTarget, options: &FilterOptions) -> Option<DoneFailure> {
        let effective = match options.as_route_options() {
            Some(_) => options.clone(),
            None => FilterOptions::from(target.method),
        };
        let method = effective.method();

        let actual = self.filter_calls(target.filter, effective).len();
        if actual == 0 {
            return Some(DoneFailure {
                name: target.name,
                kind: DoneFailureKind::NotCalled,
            });
        }

        let expected = self
            .routes()
            .iter()
            .find(|r| r.name == target.name && r.method == method)
            .and_then(|r| r.repeat)
            .filter(|&n| n > 0)?;

        if actual < expected {
            Some(DoneFailure {
                name: target.name,
                kind: DoneFailureKind::TooFewCalls { actual, expected },
            })
        } else {
            None
        }
    }

    /// Whether every expectation selected by `filter` was met.
    ///
    /// Failures are logged as warnings unless disabled in the config; use
    /// [`FetchMock::done_report`] to inspect them.
    pub fn done(&self, filter: impl Into<CallFilter>, options: impl Into<FilterOptions>) -> bool {
        let report = self.done_report(filter, options);
        if self.config().warn_on_done_failure {
            for failure in &report.failures {
                tracing::warn!(route = %failure.name, "Warning: {}", failure);
            }
        }
        report.is_done()
    }

    /// Assert at least one call is selected by a filter
    pub fn assert_called(
        &self,
        filter: impl Into<CallFilter>,
        options: impl Into<FilterOptions>,
    ) -> FetchMockResult<()> {
        let filter: CallFilter = filter.into();
        if !self.called(filter.clone(), options) {
            return Err(FetchMockError::assertion(format!(
                "Expected a call matching {:?}, but none found",
                filter
            )));
        }
        Ok(())
    }

    /// Assert no call is selected by a filter
    pub fn assert_not_called(
        &self,
        filter: impl Into<CallFilter>,
        options: impl Into<FilterOptions>,
    ) -> FetchMockResult<()> {
        let filter: CallFilter = filter.into();
        let calls = self.filter_calls(filter.clone(), options);
        if !calls.is_empty() {
            return Err(FetchMockError::assertion(format!(
                "Expected no calls matching {:?}, but found {}",
                filter,
                calls.len()
            )));
        }
        Ok(())
    }

    /// Assert exactly `times` calls are selected by a filter
    pub fn assert_called_times(
        &self,
        filter: impl Into<CallFilter>,
        options: impl Into<FilterOptions>,
        times: usize,
    ) -> FetchMockResult<()> {
        let filter: CallFilter = filter.into();
        let calls = self.filter_calls(filter.clone(), options);
        if calls.len() != times {
            return Err(FetchMockError::assertion(format!(
                "Expected {} calls matching {:?}, but found {}",
                times,
                filter,
                calls.len()
            )));
        }
        Ok(())
    }

    /// Assert every expectation selected by `filter` was met
    pub fn assert_done(
        &self,
        filter: impl Into<CallFilter>,
        options: impl Into<FilterOptions>,
    ) -> FetchMockResult<()> {
        let report = self.done_report(filter, options);
        if report.is_done() {
            Ok(())
        } else {
            Err(FetchMockError::assertion(report.to_string()))
        }
    }
}
