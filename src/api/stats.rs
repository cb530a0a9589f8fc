use crate::api::AppState;
use crate::api::schemas::stats::StatsResponse;
use crate::error::Result;
use axum::{Json, extract::State};

/// Returns aggregate statistics over all stored messages.
///
/// # Errors
/// Returns `AppError::Database` if the aggregation fails.
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.query_service.stats().await?;
    Ok(Json(stats.into()))
}
