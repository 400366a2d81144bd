use rust_decimal::Decimal;
use tokio_postgres::Row;
use tracing::instrument;

use crate::CityStandard;
use crate::db::PgPool;
use crate::db::util::TimedClientExt;
use crate::store::StoreError;

fn standard_from_row(row: &Row) -> CityStandard {
    CityStandard {
        city_name: row.get("city_name"),
        year: row.get("year"),
        base_min: row.get("base_min"),
        base_max: row.get("base_max"),
        rate: row.get("rate"),
    }
}

#[instrument(skip(pool))]
pub async fn fetch_city_standard(
    pool: &PgPool,
    city_name: &str,
    year: &str,
) -> Result<Option<CityStandard>, StoreError> {
    let client = pool.get().await?;
    let rows = client
        .timed_query_cached(
            "SELECT city_name, year, base_min, base_max, rate \
             FROM si.cities \
             WHERE city_name = $1 AND year = $2 \
             LIMIT 2",
            &[&city_name, &year],
            "fetch_city_standard",
        )
        .await?;

    match rows.as_slice() {
        [] => Ok(None),
        [row] => Ok(Some(standard_from_row(row))),
        _ => Err(StoreError::Integrity(format!(
            "multiple city standards for {city_name} in {year}"
        ))),
    }
}

#[instrument(skip(pool))]
pub async fn delete_city_standards_for_year(pool: &PgPool, year: &str) -> Result<u64, StoreError> {
    let client = pool.get().await?;
    let deleted = client
        .timed_execute_cached(
            "DELETE FROM si.cities WHERE year = $1",
            &[&year],
            "delete_city_standards_for_year",
        )
        .await?;

    Ok(deleted)
}

#[instrument(skip(pool, rows), fields(rows = rows.len()))]
pub async fn insert_city_standards(
    pool: &PgPool,
    rows: &[CityStandard],
) -> Result<u64, StoreError> {
    if rows.is_empty() {
        return Ok(0);
    }

    let city_names: Vec<&str> = rows.iter().map(|r| r.city_name.as_str()).collect();
    let years: Vec<&str> = rows.iter().map(|r| r.year.as_str()).collect();
    let base_mins: Vec<Decimal> = rows.iter().map(|r| r.base_min).collect();
    let base_maxes: Vec<Decimal> = rows.iter().map(|r| r.base_max).collect();
    let rates: Vec<Decimal> = rows.iter().map(|r| r.rate).collect();

    let client = pool.get().await?;
    let inserted = client
        .timed_execute_cached(
            "INSERT INTO si.cities (city_name, year, base_min, base_max, rate) \
             SELECT * FROM UNNEST($1::text[], $2::text[], $3::numeric[], $4::numeric[], $5::numeric[])",
            &[&city_names, &years, &base_mins, &base_maxes, &rates],
            "insert_city_standards",
        )
        .await?;

    Ok(inserted)
}
