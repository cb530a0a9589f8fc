use crate::domain::validation::ValidationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Database(e) => {
                tracing::error!(error = %e, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Internal server error" }))
            }
            Self::InvalidSignature => {
                tracing::debug!("Signature verification failed");
                (StatusCode::UNAUTHORIZED, json!({ "error": "invalid signature" }))
            }
            Self::Validation(e) => {
                tracing::debug!(field = e.field(), error = %e, "Payload validation failed");
                (StatusCode::UNPROCESSABLE_ENTITY, json!({ "error": e.to_string(), "field": e.field() }))
            }
            Self::BadRequest(msg) => {
                tracing::debug!(message = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, json!({ "error": msg }))
            }
        };

        (status, Json(body)).into_response()
    }
}
