use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::api::calculation::{CalculationRequest, ContributionResult};
use crate::contribution::aggregate::{GroupingKey, average_by_employee};
use crate::contribution::fee::{clamp_to_band, company_fee, round_money};
use crate::contribution::period::{PeriodError, PeriodSelector};
use crate::run_id;
use crate::store::{ResultInsert, SharedStore, StoreError};
use crate::{CityStandard, SalaryRecord};

#[derive(Debug, Error)]
pub enum CalculationError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("city standard not found for {city} in {year}")]
    NotFound { city: String, year: String },
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),
}

impl From<PeriodError> for CalculationError {
    fn from(value: PeriodError) -> Self {
        CalculationError::Validation(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalculatorConfig {
    pub grouping: GroupingKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculationOutcome {
    pub run_id: String,
    pub results: Vec<ContributionResult>,
}

/// Average, clamp and price every employee's salaries against one standard.
///
/// Rounding happens once per figure, after the full-precision computation.
pub fn compute_contributions(
    salaries: &[SalaryRecord],
    standard: &CityStandard,
    grouping: GroupingKey,
) -> Vec<ContributionResult> {
    average_by_employee(salaries, grouping)
        .into_iter()
        .map(|employee| {
            let base = clamp_to_band(employee.avg_salary, standard);
            let fee = company_fee(base, standard);

            ContributionResult {
                employee_name: employee.employee_name,
                avg_salary: round_money(employee.avg_salary),
                contribution_base: round_money(base),
                company_fee: round_money(fee),
            }
        })
        .collect()
}

/// Runs a calculation against an injected store and appends its results.
#[derive(Clone)]
pub struct ContributionCalculator {
    store: SharedStore,
    config: CalculatorConfig,
}

impl ContributionCalculator {
    pub fn new(store: SharedStore, config: CalculatorConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> CalculatorConfig {
        self.config
    }

    /// Either every employee's result is persisted and returned, or the call
    /// fails and nothing is written.
    #[instrument(skip(self, request), fields(year = %request.year, city = %request.city))]
    pub async fn calculate(
        &self,
        request: &CalculationRequest,
    ) -> Result<CalculationOutcome, CalculationError> {
        let started = Instant::now();

        let city = request.city.trim();
        if city.is_empty() {
            return Err(CalculationError::Validation("city is required".into()));
        }
        let period = PeriodSelector::new(&request.year, request.month_range.as_deref())?;

        let salaries = self.store.fetch_salaries(&period.salary_filter()).await?;
        debug!(salary_rows = salaries.len(), "selected salary records");

        let run_id = run_id::generate();
        if salaries.is_empty() {
            info!(%run_id, "no salary records in period; nothing to persist");
            return Ok(CalculationOutcome {
                run_id,
                results: Vec::new(),
            });
        }

        let standard = self
            .store
            .fetch_city_standard(city, period.year())
            .await?
            .ok_or_else(|| CalculationError::NotFound {
                city: city.to_string(),
                year: period.year().to_string(),
            })?;

        if !standard.has_valid_band() {
            return Err(CalculationError::Validation(format!(
                "city standard for {city} in {} has base_min {} above base_max {}",
                period.year(),
                standard.base_min,
                standard.base_max
            )));
        }

        let results = compute_contributions(&salaries, &standard, self.config.grouping);

        let calculation_month = period.month_label();
        let rows: Vec<ResultInsert> = results
            .iter()
            .map(|result| ResultInsert {
                employee_name: result.employee_name.clone(),
                avg_salary: result.avg_salary,
                contribution_base: result.contribution_base,
                company_fee: result.company_fee,
                calculation_year: period.year().to_string(),
                calculation_month: calculation_month.clone(),
                city_name: city.to_string(),
                run_id: run_id.clone(),
            })
            .collect();

        let inserted = self.store.insert_results(&rows).await?;

        info!(
            %run_id,
            employees = results.len(),
            inserted,
            grouping = self.config.grouping.as_str(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "contribution run persisted"
        );

        Ok(CalculationOutcome { run_id, results })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    use rust_decimal::Decimal;

    use super::*;
    use crate::store::{ContributionStore, MemoryStore};

    fn dec(raw: &str) -> Decimal {
        Decimal::from_str(raw).unwrap()
    }

    fn salary(id: &str, name: &str, month: &str, amount: &str) -> SalaryRecord {
        SalaryRecord {
            employee_id: id.into(),
            employee_name: name.into(),
            month: month.into(),
            salary_amount: dec(amount),
        }
    }

    fn shanghai_2024() -> CityStandard {
        CityStandard {
            city_name: "Shanghai".into(),
            year: "2024".into(),
            base_min: dec("3000"),
            base_max: dec("6000"),
            rate: dec("0.16"),
        }
    }

    fn request(year: &str, month_range: Option<&str>, city: &str) -> CalculationRequest {
        CalculationRequest {
            year: year.into(),
            month_range: month_range.map(str::to_string),
            city: city.into(),
        }
    }

    fn calculator(store: Arc<MemoryStore>) -> ContributionCalculator {
        ContributionCalculator::new(store, CalculatorConfig::default())
    }

    #[tokio::test]
    async fn clamps_alice_at_base_max() {
        let store = Arc::new(MemoryStore::with_reference_data(
            vec![shanghai_2024()],
            vec![
                salary("E1", "Alice", "202401", "5000"),
                salary("E1", "Alice", "202402", "7000"),
            ],
        ));

        let outcome = calculator(store.clone())
            .calculate(&request("2024", None, "Shanghai"))
            .await
            .unwrap();

        assert_eq!(
            outcome.results,
            vec![ContributionResult {
                employee_name: "Alice".into(),
                avg_salary: dec("6000"),
                contribution_base: dec("6000"),
                company_fee: dec("960.00"),
            }]
        );
        assert_eq!(store.result_count(), 1);
    }

    #[tokio::test]
    async fn low_average_uses_base_min() {
        let store = Arc::new(MemoryStore::with_reference_data(
            vec![shanghai_2024()],
            vec![salary("E2", "Bob", "202401", "2000")],
        ));

        let outcome = calculator(store)
            .calculate(&request("2024", None, "Shanghai"))
            .await
            .unwrap();

        assert_eq!(outcome.results[0].avg_salary, dec("2000"));
        assert_eq!(outcome.results[0].contribution_base, dec("3000"));
        assert_eq!(outcome.results[0].company_fee, dec("480.00"));
    }

    #[tokio::test]
    async fn month_range_limits_selected_records() {
        let store = Arc::new(MemoryStore::with_reference_data(
            vec![shanghai_2024()],
            vec![
                salary("E1", "Alice", "202312", "9999"),
                salary("E1", "Alice", "202401", "4000"),
                salary("E1", "Alice", "202402", "4500"),
                salary("E1", "Alice", "202403", "5000"),
                salary("E1", "Alice", "202404", "9999"),
            ],
        ));

        let outcome = calculator(store.clone())
            .calculate(&request("2024", Some("01-03"), "Shanghai"))
            .await
            .unwrap();

        assert_eq!(outcome.results[0].avg_salary, dec("4500"));

        let stored = store.list_results().await.unwrap();
        assert_eq!(stored[0].calculation_month.as_deref(), Some("01-03"));
        assert_eq!(stored[0].calculation_year.as_deref(), Some("2024"));
        assert_eq!(stored[0].run_id.as_deref(), Some(outcome.run_id.as_str()));
    }

    #[tokio::test]
    async fn missing_standard_is_not_found_and_writes_nothing() {
        let store = Arc::new(MemoryStore::with_reference_data(
            vec![shanghai_2024()],
            vec![salary("E1", "Alice", "202401", "5000")],
        ));

        let err = calculator(store.clone())
            .calculate(&request("2024", None, "Beijing"))
            .await
            .unwrap_err();

        assert!(matches!(err, CalculationError::NotFound { .. }));
        assert_eq!(store.result_count(), 0);
    }

    #[tokio::test]
    async fn failed_results_write_is_a_persistence_error() {
        let store = Arc::new(MemoryStore::with_reference_data(
            vec![shanghai_2024()],
            vec![salary("E1", "Alice", "202401", "5000")],
        ));
        store.failures.result_writes.store(true, Ordering::SeqCst);

        let err = calculator(store.clone())
            .calculate(&request("2024", None, "Shanghai"))
            .await
            .unwrap_err();

        assert!(matches!(err, CalculationError::Persistence(_)));
        assert_eq!(store.result_count(), 0);
    }

    #[tokio::test]
    async fn empty_period_returns_no_results() {
        let store = Arc::new(MemoryStore::with_reference_data(
            vec![shanghai_2024()],
            vec![salary("E1", "Alice", "202301", "5000")],
        ));

        let outcome = calculator(store.clone())
            .calculate(&request("2024", None, "Shanghai"))
            .await
            .unwrap();

        assert!(outcome.results.is_empty());
        assert_eq!(store.result_count(), 0);
    }

    #[tokio::test]
    async fn empty_period_skips_the_standard_lookup() {
        let store = Arc::new(MemoryStore::with_reference_data(
            vec![shanghai_2024()],
            vec![salary("E1", "Alice", "202401", "5000")],
        ));

        let outcome = calculator(store.clone())
            .calculate(&request("2025", None, "Nowhere"))
            .await
            .unwrap();

        assert!(outcome.results.is_empty());
        assert_eq!(store.result_count(), 0);
    }

    #[tokio::test]
    async fn rejects_missing_inputs() {
        let store = Arc::new(MemoryStore::new());
        let calc = calculator(store);

        for bad in [
            request("", None, "Shanghai"),
            request("2024", None, "  "),
            request("2024", Some("3-1"), "Shanghai"),
            request("2024", Some("Q1"), "Shanghai"),
        ] {
            let err = calc.calculate(&bad).await.unwrap_err();
            assert!(
                matches!(err, CalculationError::Validation(_)),
                "{bad:?} should fail validation, got {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn inverted_band_is_rejected() {
        let mut standard = shanghai_2024();
        standard.base_min = dec("7000");
        let store = Arc::new(MemoryStore::with_reference_data(
            vec![standard],
            vec![salary("E1", "Alice", "202401", "5000")],
        ));

        let err = calculator(store)
            .calculate(&request("2024", None, "Shanghai"))
            .await
            .unwrap_err();
        assert!(matches!(err, CalculationError::Validation(_)));
    }

    #[test]
    fn contribution_base_always_inside_band() {
        let standard = shanghai_2024();
        let salaries: Vec<SalaryRecord> = [
            "0", "1", "2999.99", "3000", "4500.555", "6000", "6000.01", "1000000",
        ]
        .iter()
        .enumerate()
        .map(|(i, amount)| salary(&format!("E{i}"), &format!("N{i}"), "202401", amount))
        .collect();

        for result in compute_contributions(&salaries, &standard, GroupingKey::EmployeeId) {
            assert!(result.contribution_base >= standard.base_min);
            assert!(result.contribution_base <= standard.base_max);
        }
    }

    #[test]
    fn rounds_once_after_full_precision() {
        // avg = 4000.005; rounding the base first would give 4000.01 * 0.5 = 2000.005 -> 2000.01.
        let standard = CityStandard {
            rate: dec("0.5"),
            ..shanghai_2024()
        };
        let salaries = vec![
            salary("E1", "Alice", "202401", "4000.00"),
            salary("E1", "Alice", "202402", "4000.01"),
        ];

        let result = &compute_contributions(&salaries, &standard, GroupingKey::EmployeeId)[0];
        assert_eq!(result.avg_salary, dec("4000.01"));
        assert_eq!(result.contribution_base, dec("4000.01"));
        assert_eq!(result.company_fee, dec("2000.00"));
    }

    #[test]
    fn fee_equals_rounded_reported_base_times_rate_for_two_place_bases() {
        let standard = shanghai_2024();
        let salaries = vec![
            salary("E1", "Alice", "202401", "12345.67"),
            salary("E2", "Bob", "202401", "4321.09"),
            salary("E3", "Carol", "202401", "1200"),
        ];

        for result in compute_contributions(&salaries, &standard, GroupingKey::EmployeeId) {
            assert_eq!(result.company_fee, round_money(result.contribution_base * standard.rate));
        }
    }

    #[test]
    fn fee_is_priced_from_the_full_precision_base() {
        // In band, with a third decimal place: the reported base is rounded but the fee is not
        // computed from it.
        let standard = CityStandard {
            rate: dec("0.5"),
            ..shanghai_2024()
        };

        for (amounts, expected_fee) in [
            (["4000.00", "4000.01"], "2000.00"),
            (["5000.01", "5000.02"], "2500.01"),
            (["3333.33", "3333.34"], "1666.67"),
        ] {
            let salaries = vec![
                salary("E1", "Alice", "202401", amounts[0]),
                salary("E1", "Alice", "202402", amounts[1]),
            ];
            let full_precision_base = (dec(amounts[0]) + dec(amounts[1])) / dec("2");

            let result = &compute_contributions(&salaries, &standard, GroupingKey::EmployeeId)[0];
            assert_eq!(result.company_fee, dec(expected_fee));
            assert_eq!(
                result.company_fee,
                round_money(clamp_to_band(full_precision_base, &standard) * standard.rate)
            );
        }
    }
}
