//! fetch-mock: Fetch Mocking for Rust Test Suites
//!
//! Register routes, let the code under test make its calls through
//! [`FetchMock::handle`], then inspect what happened.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       FETCH-MOCK Session                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌─────────────────────┐    │
//! │   │ Routes     │    │ handle()   │    │ Call log            │    │
//! │   │ (compiled  │───►│ normalize, │───►│ (append-only)       │    │
//! │   │ matchers)  │    │ match      │    │                     │    │
//! │   └────────────┘    └────────────┘    └──────────┬──────────┘    │
//! │                                                  │               │
//! │   ┌────────────┐                      ┌──────────▼──────────┐    │
//! │   │ Holding    │◄──── flush() ────────│ Inspector: calls,   │    │
//! │   │ queue      │                      │ called, last_call,  │    │
//! │   └────────────┘                      │ done                │    │
//! │                                       └─────────────────────┘    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use fetch_mock::prelude::*;
//!
//! let mut mock = FetchMock::new();
//! mock.route(
//!     RouteConfig::new("begin:https://api.example.com/users")
//!         .with_name("users")
//!         .with_repeat(1)
//!         .with_response(MockResponse::text("[]")),
//! )?;
//!
//! mock.handle("https://api.example.com/users?page=1", RequestOptions::new());
//!
//! assert!(mock.called("users", "GET"));
//! assert_eq!(
//!     mock.last_url("users", ()).as_deref(),
//!     Some("https://api.example.com/users?page=1")
//! );
//! assert!(mock.done((), ()));
//! # Ok::<(), fetch_mock::FetchMockError>(())
//! ```

#![warn(missing_docs)]

mod call;
mod config;
mod holding;
mod inspect;
pub mod logging;
mod matcher;
mod request;
mod response;
mod result;
mod route;
mod session;

pub use call::CallRecord;
pub use config::FetchMockConfig;
pub use holding::{HeldFuture, HoldingQueue};
pub use inspect::{CallFilter, DoneFailure, DoneFailureKind, DoneReport, FilterOptions, NameFilter};
pub use matcher::{Matcher, MatcherFn};
pub use request::{normalize_url, HttpMethod, RequestOptions};
pub use response::MockResponse;
pub use result::{FetchMockError, FetchMockResult};
pub use route::{Route, RouteConfig, RouteOptions};
pub use session::{FetchMock, FetchMockBuilder};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::call::*;
    pub use super::config::*;
    pub use super::holding::*;
    pub use super::inspect::*;
    pub use super::matcher::*;
    pub use super::request::*;
    pub use super::response::*;
    pub use super::result::*;
    pub use super::route::*;
    pub use super::session::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_exports_session() {
        use crate::prelude::*;
        let mock = FetchMock::new();
        assert!(!mock.called((), ()));
    }

    #[test]
    fn test_error_display() {
        let err = FetchMockError::InvalidMatcher {
            pattern: "(".to_string(),
            message: "unclosed group".to_string(),
        };
        assert!(err.to_string().contains("unclosed group"));
    }
}
