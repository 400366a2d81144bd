//! Turns uploaded sheet rows into reference data and swaps them in per year.

pub mod normalize;
pub mod replace;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::store::{ContributionStore, StoreError};

pub use normalize::{normalize_city_rows, normalize_salary_rows};
pub use replace::{DeleteFailurePolicy, ReferenceTable, ReplaceOutcome, replace_city_standards, replace_salaries};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),
}

/// Normalize raw city rows, then replace every year they cover.
pub async fn ingest_city_rows(
    store: &dyn ContributionStore,
    rows: &[Map<String, Value>],
    policy: DeleteFailurePolicy,
) -> Result<ReplaceOutcome, IngestError> {
    let standards = normalize_city_rows(rows)?;
    replace_city_standards(store, &standards, policy).await
}

/// Normalize raw salary rows, then replace every year they cover.
pub async fn ingest_salary_rows(
    store: &dyn ContributionStore,
    rows: &[Map<String, Value>],
    policy: DeleteFailurePolicy,
) -> Result<ReplaceOutcome, IngestError> {
    let salaries = normalize_salary_rows(rows)?;
    replace_salaries(store, &salaries, policy).await
}
