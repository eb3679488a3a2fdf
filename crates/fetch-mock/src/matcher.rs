//! URL Matchers
//!
//! A [`Matcher`] is the value a route was registered with. Its normalized form
//! doubles as the identity stored on every call the route serves, which is
//! what `filter_calls_by_matcher` compares against.
//!
//! String matchers use prefixes to select a strategy:
//!
//! | Input                 | Strategy                            |
//! |-----------------------|-------------------------------------|
//! | `*`                   | any URL                             |
//! | `begin:http://a.com`  | URL starts with                     |
//! | `end:.json`           | URL ends with                       |
//! | `glob:*/users/*`      | glob over the full URL              |
//! | `express:/users/:id`  | path with named segments            |
//! | `path:/users`         | exact path, query ignored           |
//! | anything else         | exact URL, after normalization      |

use crate::request::{normalize_url, parse_url, RequestOptions};
use crate::result::{FetchMockError, FetchMockResult};
use regex::Regex;
use std::sync::Arc;

/// Predicate over `(normalized_url, options)`
pub type MatcherFn = Arc<dyn Fn(&str, &RequestOptions) -> bool + Send + Sync>;

/// Pattern a route matches request URLs with
#[derive(Clone)]
pub enum Matcher {
    /// Match any URL
    Any,
    /// Exact URL match
    Url(String),
    /// Prefix match
    Begin(String),
    /// Suffix match
    End(String),
    /// Glob pattern over the full URL (e.g. `*/api/users/*`)
    Glob(String),
    /// Express-style path pattern (e.g. `/users/:id`)
    Express(String),
    /// Exact path match, ignoring origin and query
    Path(String),
    /// Regex over the full URL
    Regex(Regex),
    /// Arbitrary predicate
    Function(MatcherFn),
}

impl Matcher {
    /// Parse a string matcher, normalizing plain URLs
    #[must_use]
    pub fn parse(pattern: &str) -> Self {
        if pattern == "*" {
            return Self::Any;
        }
        if let Some(rest) = pattern.strip_prefix("begin:") {
            return Self::Begin(rest.to_string());
        }
        if let Some(rest) = pattern.strip_prefix("end:") {
            return Self::End(rest.to_string());
        }
        if let Some(rest) = pattern.strip_prefix("glob:") {
            return Self::Glob(rest.to_string());
        }
        if let Some(rest) = pattern.strip_prefix("express:") {
            return Self::Express(rest.to_string());
        }
        if let Some(rest) = pattern.strip_prefix("path:") {
            return Self::Path(rest.to_string());
        }
        Self::Url(normalize_url(pattern))
    }

    /// Build a regex matcher
    pub fn regex(pattern: &str) -> FetchMockResult<Self> {
        Regex::new(pattern)
            .map(Self::Regex)
            .map_err(|e| FetchMockError::InvalidMatcher {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }

    /// Build a predicate matcher
    pub fn function<F>(predicate: F) -> Self
    where
        F: Fn(&str, &RequestOptions) -> bool + Send + Sync + 'static,
    {
        Self::Function(Arc::new(predicate))
    }

    /// The canonical form used for identity comparison.
    ///
    /// Only exact URLs change; prefixed, regex and function matchers are
    /// already canonical.
    #[must_use]
    pub fn normalized(&self) -> Self {
        match self {
            Self::Url(url) => Self::Url(normalize_url(url)),
            other => other.clone(),
        }
    }

    pub(crate) fn compile(&self) -> CompiledMatcher {
        match self {
            Self::Any => CompiledMatcher::Any,
            Self::Url(url) => CompiledMatcher::Url(normalize_url(url)),
            Self::Begin(prefix) => CompiledMatcher::Begin(prefix.clone()),
            Self::End(suffix) => CompiledMatcher::End(suffix.clone()),
            Self::Path(path) => CompiledMatcher::Path(path.clone()),
            Self::Glob(glob) => CompiledMatcher::Pattern {
                regex: Regex::new(&glob_to_regex(glob)).ok(),
                on_path: false,
            },
            Self::Express(route) => CompiledMatcher::Pattern {
                regex: Regex::new(&express_to_regex(route)).ok(),
                on_path: true,
            },
            Self::Regex(re) => CompiledMatcher::Pattern {
                regex: Some(re.clone()),
                on_path: false,
            },
            Self::Function(f) => CompiledMatcher::Function(f.clone()),
        }
    }
}

impl PartialEq for Matcher {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Any, Self::Any) => true,
            (Self::Url(a), Self::Url(b))
            | (Self::Begin(a), Self::Begin(b))
            | (Self::End(a), Self::End(b))
            | (Self::Glob(a), Self::Glob(b))
            | (Self::Express(a), Self::Express(b))
            | (Self::Path(a), Self::Path(b)) => a == b,
            (Self::Regex(a), Self::Regex(b)) => a.as_str() == b.as_str(),
            (Self::Function(a), Self::Function(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl std::fmt::Display for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => write!(f, "*"),
            Self::Url(url) => write!(f, "{}", url),
            Self::Begin(s) => write!(f, "begin:{}", s),
            Self::End(s) => write!(f, "end:{}", s),
            Self::Glob(s) => write!(f, "glob:{}", s),
            Self::Express(s) => write!(f, "express:{}", s),
            Self::Path(s) => write!(f, "path:{}", s),
            Self::Regex(re) => write!(f, "/{}/", re.as_str()),
            Self::Function(_) => write!(f, "<function>"),
        }
    }
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Matcher({})", self)
    }
}

impl From<&str> for Matcher {
    fn from(pattern: &str) -> Self {
        Self::parse(pattern)
    }
}

impl From<String> for Matcher {
    fn from(pattern: String) -> Self {
        Self::parse(&pattern)
    }
}

impl From<Regex> for Matcher {
    fn from(re: Regex) -> Self {
        Self::Regex(re)
    }
}

/// Matcher with its patterns compiled, ready to test normalized URLs
#[derive(Clone)]
pub(crate) enum CompiledMatcher {
    Any,
    Url(String),
    Begin(String),
    End(String),
    Path(String),
    Pattern { regex: Option<Regex>, on_path: bool },
    Function(MatcherFn),
}

impl CompiledMatcher {
    pub(crate) fn matches(&self, url: &str, options: &RequestOptions) -> bool {
        match self {
            Self::Any => true,
            Self::Url(expected) => url == expected,
            Self::Begin(prefix) => url.starts_with(prefix.as_str()),
            Self::End(suffix) => url.ends_with(suffix.as_str()),
            Self::Path(path) => parse_url(url).is_some_and(|u| u.path() == path),
            Self::Pattern { regex, on_path } => {
                let Some(regex) = regex else {
                    return false;
                };
                if *on_path {
                    parse_url(url).is_some_and(|u| regex.is_match(u.path()))
                } else {
                    regex.is_match(url)
                }
            }
            Self::Function(predicate) => predicate(url, options),
        }
    }
}

fn glob_to_regex(glob: &str) -> String {
    let mut out = String::from("^");
    let mut buf = [0u8; 4];
    for ch in glob.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            _ => out.push_str(&regex::escape(ch.encode_utf8(&mut buf))),
        }
    }
    out.push('$');
    out
}

fn express_to_regex(route: &str) -> String {
    let segments: Vec<String> = route
        .trim_end_matches('/')
        .split('/')
        .map(|segment| {
            if segment.len() > 1 && segment.starts_with(':') {
                "[^/]+".to_string()
            } else {
                regex::escape(segment)
            }
        })
        .collect();
    format!("^{}/?$", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hits(matcher: &Matcher, url: &str) -> bool {
        matcher
            .compile()
            .matches(&normalize_url(url), &RequestOptions::new())
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn test_wildcard() {
            assert_eq!(Matcher::parse("*"), Matcher::Any);
        }

        #[test]
        fn test_prefixes() {
            assert_eq!(
                Matcher::parse("begin:http://a.com"),
                Matcher::Begin("http://a.com".to_string())
            );
            assert_eq!(Matcher::parse("end:.json"), Matcher::End(".json".to_string()));
            assert_eq!(Matcher::parse("glob:*/a/*"), Matcher::Glob("*/a/*".to_string()));
            assert_eq!(
                Matcher::parse("express:/users/:id"),
                Matcher::Express("/users/:id".to_string())
            );
            assert_eq!(Matcher::parse("path:/users"), Matcher::Path("/users".to_string()));
        }

        #[test]
        fn test_plain_url_is_normalized() {
            assert_eq!(
                Matcher::parse("http://EXAMPLE.com"),
                Matcher::Url("http://example.com/".to_string())
            );
        }

        #[test]
        fn test_invalid_regex() {
            let err = Matcher::regex("(unclosed").unwrap_err();
            assert!(matches!(err, FetchMockError::InvalidMatcher { .. }));
        }

        #[test]
        fn test_normalized_only_touches_urls() {
            let raw = Matcher::Url("http://a.com".to_string());
            assert_eq!(raw.normalized(), Matcher::Url("http://a.com/".to_string()));
            let begin = Matcher::Begin("HTTP://A".to_string());
            assert_eq!(begin.normalized(), begin);
        }
    }

    mod equality_tests {
        use super::*;

        #[test]
        fn test_regex_compares_by_source() {
            assert_eq!(Matcher::regex(r"\d+").unwrap(), Matcher::regex(r"\d+").unwrap());
            assert_ne!(Matcher::regex(r"\d+").unwrap(), Matcher::regex(r"\w+").unwrap());
        }

        #[test]
        fn test_function_compares_by_identity() {
            let f = Matcher::function(|_, _| true);
            let g = Matcher::function(|_, _| true);
            assert_eq!(f, f.clone());
            assert_ne!(f, g);
        }

        #[test]
        fn test_different_strategies_differ() {
            assert_ne!(Matcher::parse("begin:/a"), Matcher::parse("end:/a"));
        }
    }

    mod matching_tests {
        use super::*;

        #[test]
        fn test_exact() {
            let m = Matcher::parse("http://example.com/users");
            assert!(hits(&m, "http://example.com/users"));
            assert!(hits(&m, "HTTP://EXAMPLE.com/users"));
            assert!(!hits(&m, "http://example.com/users/1"));
        }

        #[test]
        fn test_begin_end() {
            assert!(hits(&Matcher::parse("begin:http://a.com/api"), "http://a.com/api/x"));
            assert!(!hits(&Matcher::parse("begin:http://a.com/api"), "http://b.com/api"));
            assert!(hits(&Matcher::parse("end:.json"), "http://a.com/data.json"));
            assert!(!hits(&Matcher::parse("end:.json"), "http://a.com/data.xml"));
        }

        #[test]
        fn test_glob() {
            let m = Matcher::parse("glob:*/api/users/*");
            assert!(hits(&m, "https://example.com/api/users/123"));
            assert!(!hits(&m, "https://example.com/api/posts/123"));
            assert!(hits(&Matcher::parse("glob:*.js?v=?"), "http://a.com/app.js?v=2"));
        }

        #[test]
        fn test_express() {
            let m = Matcher::parse("express:/users/:id");
            assert!(hits(&m, "http://a.com/users/42"));
            assert!(hits(&m, "http://a.com/users/42?full=true"));
            assert!(!hits(&m, "http://a.com/users/42/posts"));
            assert!(!hits(&m, "http://a.com/users"));
        }

        #[test]
        fn test_path() {
            let m = Matcher::parse("path:/users");
            assert!(hits(&m, "http://a.com/users?page=1"));
            assert!(hits(&m, "/users"));
            assert!(!hits(&m, "http://a.com/users/1"));
        }

        #[test]
        fn test_regex() {
            let m = Matcher::regex(r"/users/\d+$").unwrap();
            assert!(hits(&m, "https://api.example.com/users/123"));
            assert!(!hits(&m, "https://api.example.com/users/abc"));
        }

        #[test]
        fn test_function_sees_options() {
            let m = Matcher::function(|url, options| {
                url.contains("/search") && options.header("authorization").is_some()
            });
            let compiled = m.compile();
            let authed = RequestOptions::new().with_header("Authorization", "Bearer t");
            assert!(compiled.matches("http://a.com/search", &authed));
            assert!(!compiled.matches("http://a.com/search", &RequestOptions::new()));
        }

        #[test]
        fn test_any() {
            assert!(hits(&Matcher::Any, "anything"));
            assert!(hits(&Matcher::Any, ""));
        }
    }

    #[test]
    fn test_display_round_trips_prefixes() {
        for pattern in ["*", "begin:/a", "end:/b", "glob:*c", "express:/d/:e", "path:/f"] {
            assert_eq!(Matcher::parse(pattern).to_string(), pattern);
        }
    }
}
