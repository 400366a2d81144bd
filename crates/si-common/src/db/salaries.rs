use rust_decimal::Decimal;
use tokio_postgres::Row;
use tracing::instrument;

use crate::SalaryRecord;
use crate::db::PgPool;
use crate::db::util::TimedClientExt;
use crate::store::{SalaryFilter, StoreError};

fn salary_from_row(row: &Row) -> SalaryRecord {
    SalaryRecord {
        employee_id: row.get("employee_id"),
        employee_name: row.get("employee_name"),
        month: row.get("month"),
        salary_amount: row.get("salary_amount"),
    }
}

/// `LIKE` pattern selecting every month of `year`.
fn year_prefix_pattern(year: &str) -> String {
    let escaped = year
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("{escaped}%")
}

#[instrument(skip(pool))]
pub async fn fetch_salaries(
    pool: &PgPool,
    filter: &SalaryFilter,
) -> Result<Vec<SalaryRecord>, StoreError> {
    let client = pool.get().await?;

    let rows = match filter {
        SalaryFilter::Year(year) => {
            client
                .timed_query_cached(
                    "SELECT employee_id, employee_name, month, salary_amount \
                     FROM si.salaries \
                     WHERE month LIKE $1 \
                     ORDER BY id",
                    &[&year_prefix_pattern(year)],
                    "fetch_salaries_by_year",
                )
                .await?
        }
        SalaryFilter::MonthBetween { start, end } => {
            client
                .timed_query_cached(
                    "SELECT employee_id, employee_name, month, salary_amount \
                     FROM si.salaries \
                     WHERE month >= $1 AND month <= $2 \
                     ORDER BY id",
                    &[start, end],
                    "fetch_salaries_by_month_range",
                )
                .await?
        }
    };

    Ok(rows.iter().map(salary_from_row).collect())
}

#[instrument(skip(pool))]
pub async fn delete_salaries_for_year(pool: &PgPool, year: &str) -> Result<u64, StoreError> {
    let client = pool.get().await?;
    let deleted = client
        .timed_execute_cached(
            "DELETE FROM si.salaries WHERE month LIKE $1",
            &[&year_prefix_pattern(year)],
            "delete_salaries_for_year",
        )
        .await?;

    Ok(deleted)
}

/// Bulk insert as a single statement, so either every row lands or none does.
#[instrument(skip(pool, rows), fields(rows = rows.len()))]
pub async fn insert_salaries(pool: &PgPool, rows: &[SalaryRecord]) -> Result<u64, StoreError> {
    if rows.is_empty() {
        return Ok(0);
    }

    let employee_ids: Vec<&str> = rows.iter().map(|r| r.employee_id.as_str()).collect();
    let employee_names: Vec<&str> = rows.iter().map(|r| r.employee_name.as_str()).collect();
    let months: Vec<&str> = rows.iter().map(|r| r.month.as_str()).collect();
    let amounts: Vec<Decimal> = rows.iter().map(|r| r.salary_amount).collect();

    let client = pool.get().await?;
    let inserted = client
        .timed_execute_cached(
            "INSERT INTO si.salaries (employee_id, employee_name, month, salary_amount) \
             SELECT * FROM UNNEST($1::text[], $2::text[], $3::text[], $4::numeric[])",
            &[&employee_ids, &employee_names, &months, &amounts],
            "insert_salaries",
        )
        .await?;

    Ok(inserted)
}
