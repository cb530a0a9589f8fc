use crate::api::AppState;
use crate::api::schemas::messages::IngestResponse;
use crate::domain::message::InsertOutcome;
use crate::error::Result;
use crate::services::ingest_service::{IngestOutcome, IngestReceipt};
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};

pub const SIGNATURE_HEADER: &str = "x-signature";

/// Ingests a signed webhook message.
///
/// The body is handed over as raw bytes so the signature is checked against exactly what the
/// client sent.
///
/// # Errors
/// Returns `AppError::InvalidSignature` if `X-Signature` is missing or does not match.
/// Returns `AppError::Validation` if the body is not a valid message.
/// Returns `AppError::Database` if the message cannot be stored.
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());

    let result = state.ingest_service.ingest(&body, signature).await;
    record_outcome(&result);
    result?;

    Ok((StatusCode::OK, Json(IngestResponse::ok())))
}

/// Attaches the ingestion outcome to the request span so the access log carries it.
fn record_outcome(result: &Result<IngestReceipt>) {
    let span = tracing::Span::current();

    if let Some(outcome) = IngestOutcome::classify(result) {
        span.record("result", outcome.as_str());
    }

    match result {
        Ok(receipt) => {
            span.record("message_id", receipt.message_id.as_str());
            span.record("dup", receipt.outcome == InsertOutcome::AlreadyExists);
        }
        Err(_) => {
            span.record("dup", false);
        }
    }
}
