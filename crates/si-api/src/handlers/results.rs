use axum::{
    Json,
    extract::{Path, State},
};
use si_common::api::results::{DeleteResultResponse, ResultListResponse};

use crate::SharedState;
use crate::auth::AuthUser;
use crate::error::ApiError;

pub async fn list_results(
    State(state): State<SharedState>,
    _auth: AuthUser,
) -> Result<Json<ResultListResponse>, ApiError> {
    let items = state.store.list_results().await?;

    Ok(Json(ResultListResponse {
        total: items.len(),
        items,
    }))
}

pub async fn delete_result(
    State(state): State<SharedState>,
    _auth: AuthUser,
    Path(raw_id): Path<String>,
) -> Result<Json<DeleteResultResponse>, ApiError> {
    let id = raw_id
        .trim()
        .parse::<i64>()
        .map_err(|_| ApiError::BadRequest(format!("invalid result id: {raw_id}")))?;

    if !state.store.delete_result(id).await? {
        return Err(ApiError::NotFound(format!("result {id} not found")));
    }

    si_metrics::record_result_deleted();

    Ok(Json(DeleteResultResponse {
        id,
        status: "deleted".to_string(),
    }))
}
