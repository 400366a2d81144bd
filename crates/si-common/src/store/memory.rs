use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::api::results::StoredResult;
use crate::store::{ContributionStore, ResultInsert, SalaryFilter, StoreError};
use crate::{CityStandard, SalaryRecord};

#[derive(Debug, Default)]
struct Tables {
    cities: Vec<CityStandard>,
    salaries: Vec<SalaryRecord>,
    results: Vec<StoredResult>,
    next_result_id: i64,
}

/// Operations that can be switched to fail, for exercising error paths.
#[derive(Debug, Default)]
pub struct FailureSwitches {
    pub reads: AtomicBool,
    pub deletes: AtomicBool,
    pub result_writes: AtomicBool,
    pub reference_writes: AtomicBool,
}

/// Process-local store with the same semantics as the Postgres adapter.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    pub failures: FailureSwitches,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reference_data(cities: Vec<CityStandard>, salaries: Vec<SalaryRecord>) -> Self {
        let store = Self::new();
        {
            let mut tables = store.lock();
            tables.cities = cities;
            tables.salaries = salaries;
        }
        store
    }

    pub fn result_count(&self) -> usize {
        self.lock().results.len()
    }

    pub fn salaries(&self) -> Vec<SalaryRecord> {
        self.lock().salaries.clone()
    }

    pub fn cities(&self) -> Vec<CityStandard> {
        self.lock().cities.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        // A poisoned lock only means another test thread panicked mid-write;
        // the tables themselves are still usable.
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(switch: &AtomicBool, operation: &str) -> Result<(), StoreError> {
        if switch.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{operation} failed")));
        }
        Ok(())
    }
}

#[async_trait]
impl ContributionStore for MemoryStore {
    async fn fetch_salaries(&self, filter: &SalaryFilter) -> Result<Vec<SalaryRecord>, StoreError> {
        Self::check(&self.failures.reads, "fetch_salaries")?;
        Ok(self
            .lock()
            .salaries
            .iter()
            .filter(|record| filter.matches(&record.month))
            .cloned()
            .collect())
    }

    async fn fetch_city_standard(
        &self,
        city_name: &str,
        year: &str,
    ) -> Result<Option<CityStandard>, StoreError> {
        Self::check(&self.failures.reads, "fetch_city_standard")?;
        let tables = self.lock();
        let mut matches = tables
            .cities
            .iter()
            .filter(|standard| standard.city_name == city_name && standard.year == year);

        let first = matches.next().cloned();
        if matches.next().is_some() {
            return Err(StoreError::Integrity(format!(
                "multiple city standards for {city_name} in {year}"
            )));
        }
        Ok(first)
    }

    async fn insert_results(&self, rows: &[ResultInsert]) -> Result<u64, StoreError> {
        Self::check(&self.failures.result_writes, "insert_results")?;
        let mut tables = self.lock();
        let created_at = Utc::now();

        for row in rows {
            tables.next_result_id += 1;
            let id = tables.next_result_id;
            tables.results.push(StoredResult {
                id,
                employee_name: row.employee_name.clone(),
                avg_salary: row.avg_salary,
                contribution_base: row.contribution_base,
                company_fee: row.company_fee,
                calculation_year: Some(row.calculation_year.clone()),
                calculation_month: row.calculation_month.clone(),
                city_name: Some(row.city_name.clone()),
                run_id: Some(row.run_id.clone()),
                created_at,
            });
        }

        Ok(rows.len() as u64)
    }

    async fn list_results(&self) -> Result<Vec<StoredResult>, StoreError> {
        Self::check(&self.failures.reads, "list_results")?;
        let mut results = self.lock().results.clone();
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(results)
    }

    async fn delete_result(&self, id: i64) -> Result<bool, StoreError> {
        Self::check(&self.failures.deletes, "delete_result")?;
        let mut tables = self.lock();
        let before = tables.results.len();
        tables.results.retain(|result| result.id != id);
        Ok(tables.results.len() < before)
    }

    async fn delete_city_standards_for_year(&self, year: &str) -> Result<u64, StoreError> {
        Self::check(&self.failures.deletes, "delete_city_standards_for_year")?;
        let mut tables = self.lock();
        let before = tables.cities.len();
        tables.cities.retain(|standard| standard.year != year);
        Ok((before - tables.cities.len()) as u64)
    }

    async fn insert_city_standards(&self, rows: &[CityStandard]) -> Result<u64, StoreError> {
        Self::check(&self.failures.reference_writes, "insert_city_standards")?;
        self.lock().cities.extend_from_slice(rows);
        Ok(rows.len() as u64)
    }

    async fn delete_salaries_for_year(&self, year: &str) -> Result<u64, StoreError> {
        Self::check(&self.failures.deletes, "delete_salaries_for_year")?;
        let mut tables = self.lock();
        let before = tables.salaries.len();
        tables.salaries.retain(|record| !record.month.starts_with(year));
        Ok((before - tables.salaries.len()) as u64)
    }

    async fn insert_salaries(&self, rows: &[SalaryRecord]) -> Result<u64, StoreError> {
        Self::check(&self.failures.reference_writes, "insert_salaries")?;
        self.lock().salaries.extend_from_slice(rows);
        Ok(rows.len() as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Self::check(&self.failures.reads, "ping")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn salary(id: &str, month: &str, amount: i64) -> SalaryRecord {
        SalaryRecord {
            employee_id: id.into(),
            employee_name: format!("name-{id}"),
            month: month.into(),
            salary_amount: Decimal::from(amount),
        }
    }

    fn standard(city: &str, year: &str) -> CityStandard {
        CityStandard {
            city_name: city.into(),
            year: year.into(),
            base_min: Decimal::from(3000),
            base_max: Decimal::from(6000),
            rate: Decimal::new(16, 2),
        }
    }

    fn insert(name: &str) -> ResultInsert {
        ResultInsert {
            employee_name: name.into(),
            avg_salary: Decimal::from(1),
            contribution_base: Decimal::from(1),
            company_fee: Decimal::from(1),
            calculation_year: "2024".into(),
            calculation_month: None,
            city_name: "Shanghai".into(),
            run_id: "run".into(),
        }
    }

    #[tokio::test]
    async fn duplicate_standards_are_an_integrity_error() {
        let store = MemoryStore::with_reference_data(
            vec![standard("Shanghai", "2024"), standard("Shanghai", "2024")],
            vec![],
        );

        let err = store.fetch_city_standard("Shanghai", "2024").await.unwrap_err();
        assert!(matches!(err, StoreError::Integrity(_)));
    }

    #[tokio::test]
    async fn salary_delete_uses_month_prefix() {
        let store = MemoryStore::with_reference_data(
            vec![],
            vec![salary("1", "202312", 1), salary("1", "202401", 1), salary("2", "202402", 1)],
        );

        let deleted = store.delete_salaries_for_year("2024").await.unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(store.salaries(), vec![salary("1", "202312", 1)]);
    }

    #[tokio::test]
    async fn results_list_newest_first() {
        let store = MemoryStore::new();
        store.insert_results(&[insert("first")]).await.unwrap();
        store.insert_results(&[insert("second")]).await.unwrap();

        let listed = store.list_results().await.unwrap();
        let names: Vec<&str> = listed.iter().map(|r| r.employee_name.as_str()).collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn delete_reports_missing_ids() {
        let store = MemoryStore::new();
        store.insert_results(&[insert("only")]).await.unwrap();

        assert!(!store.delete_result(42).await.unwrap());
        assert!(store.delete_result(1).await.unwrap());
        assert_eq!(store.result_count(), 0);
    }

    #[tokio::test]
    async fn failing_result_writes_leave_table_untouched() {
        let store = MemoryStore::new();
        store.failures.result_writes.store(true, Ordering::SeqCst);

        let err = store.insert_results(&[insert("a"), insert("b")]).await;
        assert!(matches!(err, Err(StoreError::Unavailable(_))));
        assert_eq!(store.result_count(), 0);
    }
}
