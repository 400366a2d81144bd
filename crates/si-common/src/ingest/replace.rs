use std::str::FromStr;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::ingest::IngestError;
use crate::store::ContributionStore;
use crate::{CityStandard, SalaryRecord};

/// What to do when clearing a year's existing rows fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeleteFailurePolicy {
    /// Log the failure and insert anyway. Old and new rows for that year may
    /// then coexist until the next successful upload.
    #[default]
    LogAndContinue,
    /// Stop before inserting anything.
    Abort,
}

impl DeleteFailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeleteFailurePolicy::LogAndContinue => "log_and_continue",
            DeleteFailurePolicy::Abort => "abort",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown delete failure policy {0:?} (expected log_and_continue or abort)")]
pub struct UnknownDeleteFailurePolicy(String);

impl FromStr for DeleteFailurePolicy {
    type Err = UnknownDeleteFailurePolicy;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "log_and_continue" | "continue" => Ok(DeleteFailurePolicy::LogAndContinue),
            "abort" => Ok(DeleteFailurePolicy::Abort),
            other => Err(UnknownDeleteFailurePolicy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceTable {
    Cities,
    Salaries,
}

impl ReferenceTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceTable::Cities => "cities",
            ReferenceTable::Salaries => "salaries",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceOutcome {
    pub table: ReferenceTable,
    pub inserted: u64,
    pub years: Vec<String>,
    pub delete_failures: Vec<String>,
}

fn distinct_years<'a>(years: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut distinct: Vec<String> = Vec::new();
    for year in years {
        if !distinct.iter().any(|seen| seen == year) {
            distinct.push(year.to_string());
        }
    }
    distinct
}

/// Clear every listed year, returning the years whose delete failed.
async fn clear_years(
    store: &dyn ContributionStore,
    table: ReferenceTable,
    years: &[String],
    policy: DeleteFailurePolicy,
) -> Result<Vec<String>, IngestError> {
    let mut failures = Vec::new();

    for year in years {
        let result = match table {
            ReferenceTable::Cities => store.delete_city_standards_for_year(year).await,
            ReferenceTable::Salaries => store.delete_salaries_for_year(year).await,
        };

        match result {
            Ok(deleted) => {
                info!(table = table.as_str(), %year, deleted, "cleared rows for year");
            }
            Err(err) if policy == DeleteFailurePolicy::Abort => {
                warn!(table = table.as_str(), %year, error = %err, "delete failed; aborting replace");
                return Err(IngestError::Persistence(err));
            }
            Err(err) => {
                warn!(
                    table = table.as_str(),
                    %year,
                    error = %err,
                    "delete failed; inserting new rows anyway"
                );
                failures.push(year.clone());
            }
        }
    }

    Ok(failures)
}

/// Delete every city standard for each year present in `rows`, then insert
/// `rows` in one batch.
#[instrument(skip(store, rows), fields(rows = rows.len(), policy = policy.as_str()))]
pub async fn replace_city_standards(
    store: &dyn ContributionStore,
    rows: &[CityStandard],
    policy: DeleteFailurePolicy,
) -> Result<ReplaceOutcome, IngestError> {
    let table = ReferenceTable::Cities;
    let years = distinct_years(rows.iter().map(|row| row.year.as_str()));
    let delete_failures = clear_years(store, table, &years, policy).await?;
    let inserted = store.insert_city_standards(rows).await?;

    info!(table = table.as_str(), inserted, "replaced reference rows");
    Ok(ReplaceOutcome {
        table,
        inserted,
        years,
        delete_failures,
    })
}

/// Salary years come from the first four characters of `month`.
#[instrument(skip(store, rows), fields(rows = rows.len(), policy = policy.as_str()))]
pub async fn replace_salaries(
    store: &dyn ContributionStore,
    rows: &[SalaryRecord],
    policy: DeleteFailurePolicy,
) -> Result<ReplaceOutcome, IngestError> {
    let table = ReferenceTable::Salaries;
    let years = distinct_years(rows.iter().map(|row| row.month.get(..4).unwrap_or(row.month.as_str())));
    let delete_failures = clear_years(store, table, &years, policy).await?;
    let inserted = store.insert_salaries(rows).await?;

    info!(table = table.as_str(), inserted, "replaced reference rows");
    Ok(ReplaceOutcome {
        table,
        inserted,
        years,
        delete_failures,
    })
}
