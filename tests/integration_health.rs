#![allow(clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc, unreachable_pub)]
use axum::http::StatusCode;
mod common;

#[tokio::test]
async fn test_live() {
    let app = common::TestApp::spawn().await;

    let resp = app.client.get(format!("{}/health/live", app.mgmt_url)).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_ready_happy_path() {
    let app = common::TestApp::spawn().await;

    let resp = app.client.get(format!("{}/health/ready", app.mgmt_url)).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
    assert_eq!(body["secret"], "ok");
}

#[tokio::test]
async fn test_ready_without_secret() {
    let app = common::TestApp::spawn_with_secret(None).await;

    let resp = app.client.get(format!("{}/health/ready", app.mgmt_url)).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["database"], "ok");
    assert_eq!(body["secret"], "error");
}

#[tokio::test]
async fn test_ready_database_error() {
    let app = common::TestApp::spawn().await;

    // Close the pool to simulate a database outage
    app.pool.close().await;

    let resp = app.client.get(format!("{}/health/ready", app.mgmt_url)).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["database"], "error");
    assert_eq!(body["secret"], "ok");

    // Liveness does not depend on the database.
    let resp = app.client.get(format!("{}/health/live", app.mgmt_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = common::TestApp::spawn().await;

    let resp = app.client.get(format!("{}/openapi.yaml", app.server_url)).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let text = resp.text().await.unwrap();
    assert!(text.contains("/webhook"));
    assert!(text.contains(&format!("version: {}", env!("CARGO_PKG_VERSION"))));
}
