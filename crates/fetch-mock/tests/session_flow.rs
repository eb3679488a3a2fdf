//! End-to-end checks of a mocking session: register, call, flush, inspect.

use fetch_mock::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn quiet() -> FetchMock {
    fetch_mock::logging::init_logging();
    FetchMock::with_config(FetchMockConfig::new().with_warn_on_unmatched(false))
}

#[test]
fn test_matched_and_unmatched_scenario() {
    let mut mock = quiet();
    mock.route(
        RouteConfig::new("http://example.com/a")
            .with_name("r1")
            .with_response(MockResponse::text("a")),
    )
    .unwrap();

    mock.handle("http://example.com/a", RequestOptions::new());
    mock.handle("http://example.com/b", RequestOptions::new());

    let matched = mock.filter_calls_by_name(true);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].url, "http://example.com/a");
    assert_eq!(matched[0].name.as_deref(), Some("r1"));

    let unmatched = mock.filter_calls_by_name(false);
    assert_eq!(unmatched.len(), 1);
    assert_eq!(unmatched[0].url, "http://example.com/b");
    assert!(unmatched[0].unmatched);
}

#[test]
fn test_done_reports_repeat_shortfall() {
    let mut mock = quiet();
    mock.route(
        RouteConfig::new("begin:http://example.com")
            .with_name("r1")
            .with_repeat(2)
            .with_response(MockResponse::new()),
    )
    .unwrap();
    mock.handle("http://example.com/once", RequestOptions::new());

    assert!(!mock.done("r1", ()));
    let err = mock.assert_done("r1", ()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Assertion failed: r1 only called 1 times, but 2 expected"
    );

    mock.handle("http://example.com/twice", RequestOptions::new());
    assert!(mock.done("r1", ()));
}

#[test]
fn test_post_body_is_inspectable() {
    let mut mock = quiet();
    mock.post("express:/users/:id", MockResponse::status(201))
        .unwrap();

    let options = RequestOptions::new()
        .with_method(HttpMethod::Post)
        .with_json(&serde_json::json!({"name": "ada"}))
        .unwrap();
    let response = mock.handle("https://api.example.com/users/7", options).unwrap();
    assert_eq!(response.status, 201);

    let last = mock.last_options("express:/users/:id", "POST").unwrap();
    let body: serde_json::Value = last.body_json().unwrap();
    assert_eq!(body["name"], "ada");
}

#[tokio::test]
async fn test_flush_settles_held_responses() {
    let mock = quiet();
    let settled = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let settled = settled.clone();
        mock.hold(async move {
            settled.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
    }

    mock.flush(false).await.unwrap();
    assert_eq!(settled.load(Ordering::SeqCst), 2);
    assert!(mock.holding().is_empty());
}

#[tokio::test]
async fn test_flush_waits_for_requeued_responses() {
    let mock = quiet();
    let settled = Arc::new(AtomicUsize::new(0));

    let queue = mock.holding();
    let late_counter = settled.clone();
    mock.hold(async move {
        queue.push(async move {
            late_counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        Ok(())
    });

    mock.flush(true).await.unwrap();
    assert_eq!(settled.load(Ordering::SeqCst), 1);
    assert!(mock.holding().is_empty());
}

#[tokio::test]
async fn test_flush_surfaces_failed_response() {
    let mock = quiet();
    mock.hold(async { Err(FetchMockError::response("stream reset")) });

    let err = mock.flush(true).await.unwrap_err();
    assert_eq!(err.to_string(), "Response failed: stream reset");
}
