use crate::api::AppState;
use crate::api::schemas::messages::{ListMessagesParams, ListMessagesResponse};
use crate::error::{AppError, Result};
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};

/// Lists stored messages ordered by `(ts, message_id)`, filtered and paginated.
///
/// # Errors
/// Returns `AppError::BadRequest` if a query parameter is malformed or out of range.
/// Returns `AppError::Database` if the query fails.
pub async fn list_messages(
    State(state): State<AppState>,
    params: std::result::Result<Query<ListMessagesParams>, QueryRejection>,
) -> Result<Json<ListMessagesResponse>> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let (filter, pagination) = params.parse().map_err(AppError::BadRequest)?;

    let page = state.query_service.list_messages(&filter, pagination).await?;

    Ok(Json(ListMessagesResponse::new(page, pagination)))
}
