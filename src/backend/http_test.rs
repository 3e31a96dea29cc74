use super::*;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use serde_json::{Value, json};

const TIMEOUTS: HttpTimeouts = HttpTimeouts { request_secs: 5, connect_secs: 2 };

// =============================================================================
// FIXTURE BACKEND
// =============================================================================

/// Stand-in for the hosted backend: stores one delay, re-clamps on POST into
/// its own (narrower) range, and records every posted body.
#[derive(Clone)]
struct Fixture {
    delay: Arc<Mutex<i64>>,
    posted: Arc<Mutex<Vec<Value>>>,
}

impl Fixture {
    fn new(delay: i64) -> Self {
        Self { delay: Arc::new(Mutex::new(delay)), posted: Arc::new(Mutex::new(Vec::new())) }
    }
}

async fn fixture_get(State(f): State<Fixture>) -> axum::Json<Value> {
    let delay = *f.delay.lock().unwrap();
    axum::Json(json!({ "delay": delay }))
}

async fn fixture_post(State(f): State<Fixture>, axum::Json(body): axum::Json<Value>) -> axum::Json<Value> {
    f.posted.lock().unwrap().push(body.clone());
    let mut delay = f.delay.lock().unwrap();
    if let Some(v) = body.get("delay").and_then(Value::as_i64) {
        *delay = v.clamp(200, 1500);
    }
    axum::Json(json!({ "delay": *delay }))
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn serve_fixture(fixture: Fixture) -> String {
    let router = Router::new()
        .route(DELAY_PATH, get(fixture_get).post(fixture_post))
        .with_state(fixture);
    serve(router).await
}

// =============================================================================
// parse_delay_body
// =============================================================================

#[test]
fn parse_integer_delay() {
    assert_eq!(parse_delay_body(r#"{"delay":700}"#).unwrap(), 700);
}

#[test]
fn parse_negative_delay_is_passed_through() {
    assert_eq!(parse_delay_body(r#"{"delay":-3}"#).unwrap(), -3);
}

#[test]
fn parse_fractional_delay_rounds() {
    assert_eq!(parse_delay_body(r#"{"delay":699.6}"#).unwrap(), 700);
    assert_eq!(parse_delay_body(r#"{"delay":1.2}"#).unwrap(), 1);
}

#[test]
fn parse_ignores_extra_fields() {
    assert_eq!(parse_delay_body(r#"{"delay":300,"unit":"ms"}"#).unwrap(), 300);
}

#[test]
fn parse_missing_delay_errors() {
    assert!(matches!(parse_delay_body(r#"{"value":3}"#), Err(SyncError::Parse(_))));
}

#[test]
fn parse_string_delay_errors() {
    assert!(matches!(parse_delay_body(r#"{"delay":"700"}"#), Err(SyncError::Parse(_))));
}

#[test]
fn parse_invalid_json_errors() {
    assert!(matches!(parse_delay_body("not json"), Err(SyncError::Parse(_))));
}

#[test]
fn endpoint_trims_trailing_slash() {
    assert_eq!(delay_endpoint("https://example.test/"), "https://example.test/api/delay");
    assert_eq!(delay_endpoint("http://127.0.0.1:3000"), "http://127.0.0.1:3000/api/delay");
}

// =============================================================================
// HttpDelayBackend against the fixture
// =============================================================================

#[tokio::test]
async fn get_delay_reads_stored_value() {
    let base = serve_fixture(Fixture::new(900)).await;
    let backend = HttpDelayBackend::new(&base, TIMEOUTS).unwrap();
    assert_eq!(backend.get_delay().await.unwrap(), 900);
}

#[tokio::test]
async fn post_delay_sends_json_and_returns_echo() {
    let fixture = Fixture::new(700);
    let base = serve_fixture(fixture.clone()).await;
    let backend = HttpDelayBackend::new(&base, TIMEOUTS).unwrap();

    assert_eq!(backend.post_delay(600).await.unwrap(), 600);
    assert_eq!(fixture.posted.lock().unwrap().as_slice(), &[json!({ "delay": 600 })]);
    assert_eq!(backend.get_delay().await.unwrap(), 600);
}

#[tokio::test]
async fn post_delay_returns_backend_reclamped_value() {
    let base = serve_fixture(Fixture::new(700)).await;
    let backend = HttpDelayBackend::new(&base, TIMEOUTS).unwrap();
    assert_eq!(backend.post_delay(2000).await.unwrap(), 1500);
}

#[tokio::test]
async fn non_success_status_is_status_error() {
    let router = Router::new().route(DELAY_PATH, get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }));
    let base = serve(router).await;
    let backend = HttpDelayBackend::new(&base, TIMEOUTS).unwrap();

    let err = backend.get_delay().await.unwrap_err();
    assert!(matches!(err, SyncError::Status { status: 500, ref body } if body == "boom"));
}

#[tokio::test]
async fn missing_route_is_status_error() {
    let base = serve(Router::new()).await;
    let backend = HttpDelayBackend::new(&base, TIMEOUTS).unwrap();
    assert!(matches!(backend.post_delay(500).await, Err(SyncError::Status { status: 404, .. })));
}

#[tokio::test]
async fn malformed_body_is_parse_error() {
    let router = Router::new().route(DELAY_PATH, get(|| async { "ok" }));
    let base = serve(router).await;
    let backend = HttpDelayBackend::new(&base, TIMEOUTS).unwrap();
    assert!(matches!(backend.get_delay().await, Err(SyncError::Parse(_))));
}

#[tokio::test]
async fn unreachable_backend_is_request_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = HttpDelayBackend::new(&format!("http://{addr}"), TIMEOUTS).unwrap();
    assert!(matches!(backend.get_delay().await, Err(SyncError::Request(_))));
}
