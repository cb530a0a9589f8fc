use crate::api::MgmtState;
use crate::api::schemas::health::HealthResponse;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

/// Liveness probe: returns 200 OK as long as the server is running.
pub async fn live() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Readiness probe: checks connectivity to the database and that a webhook secret is set.
pub async fn ready(State(state): State<MgmtState>) -> impl IntoResponse {
    let db_res = state.health_service.check_db().await;
    let secret_res = state.health_service.check_secret();

    let mut status_code = StatusCode::OK;
    let db_status = if let Err(e) = db_res {
        tracing::warn!(error = %e, component = "database", "Readiness probe failed");
        status_code = StatusCode::SERVICE_UNAVAILABLE;
        "error"
    } else {
        "ok"
    };

    let secret_status = if let Err(e) = secret_res {
        tracing::warn!(error = %e, component = "secret", "Readiness probe failed");
        status_code = StatusCode::SERVICE_UNAVAILABLE;
        "error"
    } else {
        "ok"
    };

    let response = HealthResponse {
        status: if status_code == StatusCode::OK { "ok" } else { "error" }.to_string(),
        database: db_status.to_string(),
        secret: secret_status.to_string(),
    };

    (status_code, Json(response))
}
