use crate::api::MgmtState;
use axum::{
    extract::{MatchedPath, Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Instant;

const LATENCY_BUCKETS_MS: [f64; 9] = [10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0];

#[derive(Clone, Debug)]
pub struct HttpMetrics {
    requests_total: IntCounterVec,
    latency_ms: Histogram,
}

impl HttpMetrics {
    /// # Errors
    /// Returns `prometheus::Error` if the collectors cannot be registered.
    pub fn new(registry: &Registry) -> prometheus::Result<Self> {
        let requests_total =
            IntCounterVec::new(Opts::new("http_requests_total", "Total HTTP requests by path and status"), &[
                "path", "status",
            ])?;
        let latency_ms = Histogram::with_opts(
            HistogramOpts::new("request_latency_ms", "Request latency in milliseconds")
                .buckets(LATENCY_BUCKETS_MS.to_vec()),
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(latency_ms.clone()))?;

        Ok(Self { requests_total, latency_ms })
    }
}

/// Counts every request by route and status and records its latency.
pub async fn track_http_metrics(State(metrics): State<HttpMetrics>, request: Request, next: Next) -> Response {
    let path = request.extensions().get::<MatchedPath>().map_or("unmatched", MatchedPath::as_str).to_owned();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    metrics.requests_total.with_label_values(&[path.as_str(), response.status().as_str()]).inc();
    metrics.latency_ms.observe(latency_ms);

    response
}

/// Renders every registered collector in the Prometheus text format.
pub async fn render(State(state): State<MgmtState>) -> Response {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&state.registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    ([(header::CONTENT_TYPE, encoder.format_type().to_owned())], buffer).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_histogram_uses_configured_buckets() {
        let registry = Registry::new();
        let metrics = HttpMetrics::new(&registry).expect("metrics register");
        metrics.latency_ms.observe(42.0);
        metrics.requests_total.with_label_values(&["/webhook", "200"]).inc();

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&registry.gather(), &mut buffer).expect("encode");
        let text = String::from_utf8(buffer).expect("utf8");

        assert!(text.contains(r#"request_latency_ms_bucket{le="50"} 1"#));
        assert!(text.contains(r#"request_latency_ms_bucket{le="25"} 0"#));
        assert!(text.contains(r#"http_requests_total{path="/webhook",status="200"} 1"#));
    }

    #[test]
    fn test_double_registration_fails() {
        let registry = Registry::new();
        assert!(HttpMetrics::new(&registry).is_ok());
        assert!(HttpMetrics::new(&registry).is_err());
    }
}
