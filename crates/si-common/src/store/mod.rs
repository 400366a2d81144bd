//! Storage port used by the calculator and the ingestion path.
//!
//! `ContributionStore` covers both the reference data (salaries and city
//! standards) and the append-only results table. The Postgres adapter lives in
//! [`crate::db::PgContributionStore`]; [`memory::MemoryStore`] backs tests and
//! local runs.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::api::results::StoredResult;
use crate::db::db_error;
use crate::{CityStandard, SalaryRecord};

pub use memory::MemoryStore;

db_error!(StoreError {
    #[error("integrity violation: {0}")]
    Integrity(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
});

/// Which salary rows a calculation reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SalaryFilter {
    /// Every row whose `month` starts with the year.
    Year(String),
    /// Rows whose `month` lies in `[start, end]` under string ordering.
    MonthBetween { start: String, end: String },
}

impl SalaryFilter {
    pub fn matches(&self, month: &str) -> bool {
        match self {
            SalaryFilter::Year(year) => month.starts_with(year.as_str()),
            SalaryFilter::MonthBetween { start, end } => {
                month >= start.as_str() && month <= end.as_str()
            }
        }
    }
}

/// A result row ready to be appended; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultInsert {
    pub employee_name: String,
    pub avg_salary: Decimal,
    pub contribution_base: Decimal,
    pub company_fee: Decimal,
    pub calculation_year: String,
    pub calculation_month: Option<String>,
    pub city_name: String,
    pub run_id: String,
}

#[async_trait]
pub trait ContributionStore: Send + Sync {
    /// Salary rows matching `filter`, in insertion order.
    async fn fetch_salaries(&self, filter: &SalaryFilter) -> Result<Vec<SalaryRecord>, StoreError>;

    /// The single standard for `(city_name, year)`. More than one row is an
    /// integrity error.
    async fn fetch_city_standard(
        &self,
        city_name: &str,
        year: &str,
    ) -> Result<Option<CityStandard>, StoreError>;

    /// Appends every row or none of them.
    async fn insert_results(&self, rows: &[ResultInsert]) -> Result<u64, StoreError>;

    /// All stored results, newest first.
    async fn list_results(&self) -> Result<Vec<StoredResult>, StoreError>;

    /// Returns `false` when no row had this id.
    async fn delete_result(&self, id: i64) -> Result<bool, StoreError>;

    async fn delete_city_standards_for_year(&self, year: &str) -> Result<u64, StoreError>;

    async fn insert_city_standards(&self, rows: &[CityStandard]) -> Result<u64, StoreError>;

    /// Deletes salary rows whose `month` starts with `year`.
    async fn delete_salaries_for_year(&self, year: &str) -> Result<u64, StoreError>;

    async fn insert_salaries(&self, rows: &[SalaryRecord]) -> Result<u64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

pub type SharedStore = Arc<dyn ContributionStore>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_filter_is_a_prefix_match() {
        let filter = SalaryFilter::Year("2024".into());
        assert!(filter.matches("202401"));
        assert!(filter.matches("202412"));
        assert!(!filter.matches("202312"));
    }

    #[test]
    fn month_between_is_inclusive() {
        let filter = SalaryFilter::MonthBetween {
            start: "202401".into(),
            end: "202403".into(),
        };
        assert!(filter.matches("202401"));
        assert!(filter.matches("202403"));
        assert!(!filter.matches("202404"));
        assert!(!filter.matches("202312"));
    }
}
