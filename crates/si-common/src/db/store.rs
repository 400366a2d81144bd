use async_trait::async_trait;

use crate::api::results::StoredResult;
use crate::db::{self, PgPool};
use crate::store::{ContributionStore, ResultInsert, SalaryFilter, StoreError};
use crate::{CityStandard, SalaryRecord};

/// Postgres-backed store. Each call checks out its own pooled connection; no
/// transaction spans the reads and the results write of a calculation.
#[derive(Clone)]
pub struct PgContributionStore {
    pool: PgPool,
}

impl PgContributionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ContributionStore for PgContributionStore {
    async fn fetch_salaries(&self, filter: &SalaryFilter) -> Result<Vec<SalaryRecord>, StoreError> {
        db::fetch_salaries(&self.pool, filter).await
    }

    async fn fetch_city_standard(
        &self,
        city_name: &str,
        year: &str,
    ) -> Result<Option<CityStandard>, StoreError> {
        db::fetch_city_standard(&self.pool, city_name, year).await
    }

    async fn insert_results(&self, rows: &[ResultInsert]) -> Result<u64, StoreError> {
        db::insert_results(&self.pool, rows).await
    }

    async fn list_results(&self) -> Result<Vec<StoredResult>, StoreError> {
        db::list_results(&self.pool).await
    }

    async fn delete_result(&self, id: i64) -> Result<bool, StoreError> {
        db::delete_result(&self.pool, id).await
    }

    async fn delete_city_standards_for_year(&self, year: &str) -> Result<u64, StoreError> {
        db::delete_city_standards_for_year(&self.pool, year).await
    }

    async fn insert_city_standards(&self, rows: &[CityStandard]) -> Result<u64, StoreError> {
        db::insert_city_standards(&self.pool, rows).await
    }

    async fn delete_salaries_for_year(&self, year: &str) -> Result<u64, StoreError> {
        db::delete_salaries_for_year(&self.pool, year).await
    }

    async fn insert_salaries(&self, rows: &[SalaryRecord]) -> Result<u64, StoreError> {
        db::insert_salaries(&self.pool, rows).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        client.simple_query("SELECT 1").await?;
        Ok(())
    }
}
