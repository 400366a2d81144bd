use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;

/// Accepts `"2024"` or `2024`; `null` reads as empty.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "expected a string or integer, got {other}"
        ))),
    }
}

/// Body of `POST /api/calculate`.
///
/// Missing fields deserialize to empty values so the calculator can reject
/// them with a validation error instead of a body rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationRequest {
    #[serde(default, deserialize_with = "string_or_number")]
    pub year: String,
    #[serde(default, rename = "monthRange", alias = "month_range")]
    pub month_range: Option<String>,
    #[serde(default)]
    pub city: String,
}

/// Per-employee figures, rounded to two decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionResult {
    pub employee_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_salary: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub contribution_base: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub company_fee: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationResponse {
    pub run_id: String,
    pub employee_count: usize,
    pub results: Vec<ContributionResult>,
}
