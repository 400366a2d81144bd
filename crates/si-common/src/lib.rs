pub mod api;
pub mod contribution;
pub mod db;
pub mod ingest;
pub mod logging;
pub mod run_id;
pub mod schema;
pub mod store;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// Reference data rows shared by the calculator, the stores and ingestion.

/// One month of pay for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRecord {
    pub employee_id: String,
    pub employee_name: String,
    /// Pay period as `YYYYMM`.
    pub month: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub salary_amount: Decimal,
}

/// Contribution-base band and employer rate for a city in a given year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityStandard {
    pub city_name: String,
    pub year: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub base_min: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub base_max: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
}

impl CityStandard {
    pub fn has_valid_band(&self) -> bool {
        self.base_min <= self.base_max
    }
}
