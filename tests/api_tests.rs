mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use template_advisor::api::{app_router, AppState};
use template_advisor::core::config::AppConfig;
use tower::ServiceExt;

fn configured(harness: &common::Harness) -> Router {
    app_router(AppState::new(harness.service()))
}

fn unconfigured() -> Router {
    app_router(AppState::from_config(&AppConfig::default()))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn missing_ticker_is_bad_request() {
    let harness = common::acme();
    let (status, body) = send(configured(&harness), post_json("/", json!({"userId": "u1"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Ticker symbol is required");
    assert_eq!(harness.search_calls(), 0);
}

#[tokio::test]
async fn missing_credentials_is_server_error() {
    let (status, body) = send(
        unconfigured(),
        post_json("/generate-ai-template", json!({"ticker": "ACME"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("SEC API key and OpenAI API key are required"));
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn ticker_with_query_syntax_is_bad_request() {
    let harness = common::acme();
    let (status, body) = send(
        configured(&harness),
        post_json("/", json!({"ticker": "X) OR (formType:8-K"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid ticker symbol"));
    assert_eq!(harness.search_calls(), 0);
}

#[tokio::test]
async fn ticker_is_checked_before_credentials() {
    let (status, _) = send(unconfigured(), post_json("/", json!({"ticker": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let harness = common::acme();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(configured(&harness), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test]
async fn other_methods_are_not_allowed() {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/generate-ai-template")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(unconfigured(), request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method not allowed");
}

#[tokio::test]
async fn preflight_is_no_content_with_cors_headers() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/")
        .header(header::ORIGIN, "https://app.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = unconfigured().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn health_is_ok() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = unconfigured().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn acme_with_failed_risk_section_is_ok() {
    let harness = common::acme();
    let (status, body) = send(
        configured(&harness),
        post_json("/generate-ai-template", json!({"ticker": "acme", "userId": "u1"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ticker"], "ACME");
    assert_eq!(body["companyName"], "Acme Corporation");

    let data = &body["templateData"];
    assert_eq!(data["tickerSymbol"], "ACME");
    assert_eq!(data["financials"]["revenue"], "$48210M");
    let structured = &data["structuredData"];
    assert_eq!(structured["incomeStatement"][2]["totalRevenue"], 48210.0);
    assert_eq!(structured["companyProfile"]["risks"], json!([]));
    assert_eq!(structured["degradedStages"][0]["stage"], "section:1A");
    assert!(body["filingsSummary"]["tenK"]
        .as_str()
        .unwrap()
        .contains("2025-02-14"));
    assert_eq!(body["filingsSummary"]["tenQ"], "N/A");
}

#[tokio::test]
async fn unknown_ticker_is_server_error_without_extraction() {
    let harness = common::zzzz();
    let (status, body) = send(configured(&harness), post_json("/", json!({"ticker": "ZZZZ"}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "No SEC filings found for ticker: ZZZZ");
    assert_eq!(harness.extraction_calls(), 0);
    assert_eq!(harness.model_calls(), 0);
}

#[tokio::test]
async fn refused_search_reports_status_and_body() {
    let harness = common::rejected_search();
    let (status, body) = send(configured(&harness), post_json("/", json!({"ticker": "ACME"}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "SEC API error: 401");
    assert_eq!(body["details"], "bad token");
    assert_eq!(harness.extraction_calls(), 0);
}

#[tokio::test]
async fn failing_model_still_returns_a_template() {
    let harness = common::acme_with_failing_model();
    let (status, body) = send(configured(&harness), post_json("/", json!({"ticker": "ACME"}))).await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["templateData"];
    assert_eq!(data["ceoName"], "N/A");
    assert_eq!(data["structuredData"]["companyProfile"]["industrySector"], "N/A");
    let stages: Vec<&str> = data["structuredData"]["degradedStages"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|s| s["stage"].as_str())
        .collect();
    assert!(stages.contains(&"businessSummary"));
    assert!(stages.contains(&"executiveSummary"));
}
