#![allow(dead_code, clippy::unwrap_used, clippy::missing_panics_doc, unreachable_pub)]

use axum::http::StatusCode;
use clap::Parser;
use hookbox::api::{MgmtState, app_router, mgmt_router};
use hookbox::config::{Config, DatabaseConfig};
use hookbox::services::signature_service::compute_signature;
use hookbox::storage::{self, DbPool};
use hookbox::AppBuilder;
use serde_json::json;
use std::sync::Once;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const SECRET: &str = "testsecret";

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("hookbox=debug".parse().unwrap())
            .add_directive("sqlx=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
    });
}

/// Builds a config for a throwaway database. `secret` of `None` leaves the webhook secret unset.
pub fn get_test_config(dir: &TempDir, secret: Option<&str>) -> Config {
    let url = format!("sqlite://{}", dir.path().join("test.db").display());
    Config::try_parse_from([
        "hookbox",
        "--database-url",
        &url,
        "--webhook-secret",
        secret.unwrap_or(""),
        "--host",
        "127.0.0.1",
        "--port",
        "0",
        "--mgmt-port",
        "0",
        "--log-format",
        "text",
    ])
    .unwrap()
}

/// Opens a migrated pool on a fresh database inside `dir`.
pub async fn get_test_pool(dir: &TempDir) -> DbPool {
    setup_tracing();
    let config = DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("test.db").display()),
        max_connections: 8,
        acquire_timeout_secs: 5,
        busy_timeout_ms: 5000,
    };
    let pool = storage::init_pool(&config).await.expect("Failed to open test database");
    hookbox::run_migrations(&pool).await.expect("Failed to run migrations");
    pool
}

pub fn sign(body: &str) -> String {
    compute_signature(body.as_bytes(), SECRET.as_bytes())
}

pub fn message_body(message_id: &str, from: &str, ts: &str, text: Option<&str>) -> String {
    json!({
        "message_id": message_id,
        "from": from,
        "to": "+14155550100",
        "ts": ts,
        "text": text,
    })
    .to_string()
}

pub struct TestApp {
    pub server_url: String,
    pub mgmt_url: String,
    pub client: reqwest::Client,
    pub pool: DbPool,
    pub config: Config,
    _dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_secret(Some(SECRET)).await
    }

    pub async fn spawn_with_secret(secret: Option<&str>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = get_test_config(&dir, secret);
        Self::spawn_with_config(config, dir).await
    }

    pub async fn spawn_with_config(config: Config, dir: TempDir) -> Self {
        setup_tracing();

        let pool = storage::init_pool(&config.database).await.expect("Failed to open test database");
        hookbox::run_migrations(&pool).await.expect("Failed to run migrations");

        let app = AppBuilder::new(config.clone()).with_database(pool.clone()).build().unwrap();
        let api = app_router(&config, app.services);
        let mgmt =
            mgmt_router(MgmtState { health_service: app.health_service, registry: app.registry }, app.http_metrics);

        let api_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mgmt_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server_url = format!("http://{}", api_listener.local_addr().unwrap());
        let mgmt_url = format!("http://{}", mgmt_listener.local_addr().unwrap());

        tokio::spawn(async move { axum::serve(api_listener, api).await.unwrap() });
        tokio::spawn(async move { axum::serve(mgmt_listener, mgmt).await.unwrap() });

        Self { server_url, mgmt_url, client: reqwest::Client::new(), pool, config, _dir: dir }
    }

    /// Posts `body` signed with the test secret.
    pub async fn post_webhook(&self, body: &str) -> reqwest::Response {
        self.post_webhook_with_signature(body, Some(&sign(body))).await
    }

    pub async fn post_webhook_with_signature(&self, body: &str, signature: Option<&str>) -> reqwest::Response {
        let mut request = self
            .client
            .post(format!("{}/webhook", self.server_url))
            .header("content-type", "application/json")
            .body(body.to_owned());
        if let Some(signature) = signature {
            request = request.header("x-signature", signature);
        }
        request.send().await.unwrap()
    }

    /// Posts a signed message and asserts it was accepted.
    pub async fn ingest(&self, message_id: &str, from: &str, ts: &str, text: Option<&str>) {
        let resp = self.post_webhook(&message_body(message_id, from, ts, text)).await;
        assert_eq!(resp.status(), StatusCode::OK, "ingest of {message_id} failed");
    }

    pub async fn get_json(&self, path_and_query: &str) -> (StatusCode, serde_json::Value) {
        let resp = self.client.get(format!("{}{}", self.server_url, path_and_query)).send().await.unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    pub async fn metrics_text(&self) -> String {
        let resp = self.client.get(format!("{}/metrics", self.mgmt_url)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        resp.text().await.unwrap()
    }

    pub async fn count_rows(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages").fetch_one(&self.pool).await.unwrap()
    }
}
