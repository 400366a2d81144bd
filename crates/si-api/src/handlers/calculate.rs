use axum::{Json, extract::State};
use si_common::api::calculation::{CalculationRequest, CalculationResponse};
use si_common::contribution::CalculationError;
use tracing::info;

use crate::SharedState;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::ApiJson;

fn outcome_label(err: &CalculationError) -> &'static str {
    match err {
        CalculationError::Validation(_) => "validation_error",
        CalculationError::NotFound { .. } => "not_found",
        CalculationError::Persistence(_) => "persistence_error",
    }
}

pub async fn calculate(
    State(state): State<SharedState>,
    auth: AuthUser,
    ApiJson(request): ApiJson<CalculationRequest>,
) -> Result<Json<CalculationResponse>, ApiError> {
    match state.calculator.calculate(&request).await {
        Ok(outcome) => {
            if outcome.results.is_empty() {
                si_metrics::record_calculation_outcome("empty");
            } else {
                si_metrics::record_calculation_succeeded(
                    request.city.trim(),
                    outcome.results.len(),
                );
            }
            info!(
                subject = %auth.subject,
                run_id = %outcome.run_id,
                employees = outcome.results.len(),
                "calculation completed"
            );

            Ok(Json(CalculationResponse {
                run_id: outcome.run_id,
                employee_count: outcome.results.len(),
                results: outcome.results,
            }))
        }
        Err(err) => {
            si_metrics::record_calculation_outcome(outcome_label(&err));
            Err(err.into())
        }
    }
}
