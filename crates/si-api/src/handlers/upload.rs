use axum::{Json, extract::State};
use si_common::api::upload::{UploadRequest, UploadResponse};
use si_common::ingest::{ReplaceOutcome, ingest_city_rows, ingest_salary_rows};

use crate::SharedState;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::ApiJson;

fn to_response(outcome: ReplaceOutcome) -> UploadResponse {
    si_metrics::record_upload(outcome.table.as_str(), outcome.inserted);

    UploadResponse {
        table: outcome.table.as_str().to_string(),
        inserted: outcome.inserted,
        years: outcome.years,
        delete_failures: outcome.delete_failures,
    }
}

pub async fn upload_cities(
    State(state): State<SharedState>,
    _auth: AuthUser,
    ApiJson(payload): ApiJson<UploadRequest>,
) -> Result<Json<UploadResponse>, ApiError> {
    let outcome = ingest_city_rows(
        state.store.as_ref(),
        &payload.rows,
        state.config.delete_policy,
    )
    .await?;

    Ok(Json(to_response(outcome)))
}

pub async fn upload_salaries(
    State(state): State<SharedState>,
    _auth: AuthUser,
    ApiJson(payload): ApiJson<UploadRequest>,
) -> Result<Json<UploadResponse>, ApiError> {
    let outcome = ingest_salary_rows(
        state.store.as_ref(),
        &payload.rows,
        state.config.delete_policy,
    )
    .await?;

    Ok(Json(to_response(outcome)))
}
