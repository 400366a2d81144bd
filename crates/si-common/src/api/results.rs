use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A persisted contribution result row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResult {
    pub id: i64,
    pub employee_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_salary: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub contribution_base: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub company_fee: Decimal,
    pub calculation_year: Option<String>,
    pub calculation_month: Option<String>,
    pub city_name: Option<String>,
    pub run_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultListResponse {
    pub items: Vec<StoredResult>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResultResponse {
    pub id: i64,
    pub status: String,
}
