//! Health and documentation endpoints.
//!
//! Run with: `cargo test -p vesper-api --test health_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use helpers::{api_path, setup_test_app};

#[tokio::test]
async fn test_health_reports_ok() {
    let app = setup_test_app().await;

    let response = app.client().get(&api_path("/health")).await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_readiness_checks_database() {
    let app = setup_test_app().await;

    let response = app.client().get(&api_path("/health/ready")).await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["database"], "connected");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = setup_test_app().await;

    let response = app.client().get(vesper_api::constants::OPENAPI_PATH).await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert!(body["paths"]["/api/v1/hymns"].is_object());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = setup_test_app().await;

    let response = app.client().get(&api_path("/does-not-exist")).await;

    assert_eq!(response.status_code(), 404);
}
