use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio_postgres::Row;
use tracing::instrument;

use crate::api::results::StoredResult;
use crate::db::PgPool;
use crate::db::util::TimedClientExt;
use crate::store::{ResultInsert, StoreError};

fn result_from_row(row: &Row) -> StoredResult {
    StoredResult {
        id: row.get("id"),
        employee_name: row.get("employee_name"),
        avg_salary: row.get("avg_salary"),
        contribution_base: row.get("contribution_base"),
        company_fee: row.get("company_fee"),
        calculation_year: row.get("calculation_year"),
        calculation_month: row.get("calculation_month"),
        city_name: row.get("city_name"),
        run_id: row.get("run_id"),
        created_at: row.get::<_, DateTime<Utc>>("created_at"),
    }
}

/// Append one calculation run in a single statement.
#[instrument(skip(pool, rows), fields(rows = rows.len()))]
pub async fn insert_results(pool: &PgPool, rows: &[ResultInsert]) -> Result<u64, StoreError> {
    if rows.is_empty() {
        return Ok(0);
    }

    let names: Vec<&str> = rows.iter().map(|r| r.employee_name.as_str()).collect();
    let averages: Vec<Decimal> = rows.iter().map(|r| r.avg_salary).collect();
    let bases: Vec<Decimal> = rows.iter().map(|r| r.contribution_base).collect();
    let fees: Vec<Decimal> = rows.iter().map(|r| r.company_fee).collect();
    let years: Vec<&str> = rows.iter().map(|r| r.calculation_year.as_str()).collect();
    let months: Vec<Option<&str>> = rows.iter().map(|r| r.calculation_month.as_deref()).collect();
    let cities: Vec<&str> = rows.iter().map(|r| r.city_name.as_str()).collect();
    let run_ids: Vec<&str> = rows.iter().map(|r| r.run_id.as_str()).collect();

    let client = pool.get().await?;
    let inserted = client
        .timed_execute_cached(
            "INSERT INTO si.results (\
                employee_name,\
                avg_salary,\
                contribution_base,\
                company_fee,\
                calculation_year,\
                calculation_month,\
                city_name,\
                run_id\
            ) \
            SELECT * FROM UNNEST(\
                $1::text[], $2::numeric[], $3::numeric[], $4::numeric[],\
                $5::text[], $6::text[], $7::text[], $8::text[]\
            )",
            &[
                &names, &averages, &bases, &fees, &years, &months, &cities, &run_ids,
            ],
            "insert_results",
        )
        .await?;

    Ok(inserted)
}

#[instrument(skip(pool))]
pub async fn list_results(pool: &PgPool) -> Result<Vec<StoredResult>, StoreError> {
    let client = pool.get().await?;
    let rows = client
        .timed_query_cached(
            "SELECT id, employee_name, avg_salary, contribution_base, company_fee, \
                    calculation_year, calculation_month, city_name, run_id, created_at \
             FROM si.results \
             ORDER BY created_at DESC, id DESC",
            &[],
            "list_results",
        )
        .await?;

    Ok(rows.iter().map(result_from_row).collect())
}

#[instrument(skip(pool))]
pub async fn delete_result(pool: &PgPool, id: i64) -> Result<bool, StoreError> {
    let client = pool.get().await?;
    let deleted = client
        .timed_execute_cached("DELETE FROM si.results WHERE id = $1", &[&id], "delete_result")
        .await?;

    Ok(deleted > 0)
}
