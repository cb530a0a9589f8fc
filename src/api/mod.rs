use crate::api::metrics::{HttpMetrics, track_http_metrics};
use crate::config::Config;
use crate::services::health_service::HealthService;
use crate::services::ingest_service::IngestService;
use crate::services::query_service::QueryService;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, Request};
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use prometheus::Registry;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod docs;
pub mod health;
pub mod messages;
pub mod metrics;
pub mod schemas;
pub mod stats;
pub mod webhook;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Debug)]
pub struct AppState {
    pub ingest_service: IngestService,
    pub query_service: QueryService,
}

#[derive(Clone, Debug)]
pub struct MgmtState {
    pub health_service: HealthService,
    pub registry: Registry,
}

#[derive(Debug)]
pub struct ServiceContainer {
    pub ingest_service: IngestService,
    pub query_service: QueryService,
    pub http_metrics: HttpMetrics,
}

/// Configures and returns the public API router.
pub fn app_router(config: &Config, services: ServiceContainer) -> Router {
    let state = AppState { ingest_service: services.ingest_service, query_service: services.query_service };

    Router::new()
        .route("/webhook", post(webhook::receive_webhook))
        .route("/messages", get(messages::list_messages))
        .route("/stats", get(stats::get_stats))
        .route("/openapi.yaml", get(docs::openapi_yaml))
        .layer(DefaultBodyLimit::max(config.webhook.max_body_bytes))
        .layer(from_fn_with_state(services.http_metrics, track_http_metrics))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER)))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<RequestId>()
                        .map(|id| id.header_value().to_str().unwrap_or_default())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                        "otel.kind" = "server",
                        "message_id" = tracing::field::Empty,
                        "dup" = tracing::field::Empty,
                        "result" = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, span: &tracing::Span| {
                        let status = response.status();
                        span.record("http.response.status_code", status.as_u16());

                        if status.is_server_error() {
                            tracing::error!(latency_ms = %latency.as_millis(), status = %status.as_u16(), "request completed");
                        } else {
                            tracing::info!(latency_ms = %latency.as_millis(), status = %status.as_u16(), "request completed");
                        }
                    },
                )
                .on_failure(
                    |error: ServerErrorsFailureClass, _latency: std::time::Duration, _span: &tracing::Span| {
                        tracing::error!(error = %error, "request failed");
                    },
                ),
        )
        .layer(SetRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER), MakeRequestUuid))
        .with_state(state)
}

/// Configures the management router serving health probes and metrics.
pub fn mgmt_router(state: MgmtState, http_metrics: HttpMetrics) -> Router {
    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .route("/metrics", get(metrics::render))
        .layer(from_fn_with_state(http_metrics, track_http_metrics))
        .with_state(state)
}
