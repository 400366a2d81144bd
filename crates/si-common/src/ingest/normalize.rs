use std::collections::HashSet;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::ingest::IngestError;
use crate::{CityStandard, SalaryRecord};

/// Header variants accepted for the city name, misspelled legacy header first.
const CITY_NAME_COLUMNS: &[&str] = &["city_namte ", "city_name"];

type Row = Map<String, Value>;

fn invalid(row: usize, message: impl std::fmt::Display) -> IngestError {
    IngestError::Validation(format!("row {row}: {message}"))
}

/// Cell as text. Numbers are rendered without a trailing `.0` so a year typed
/// as `2024` in the sheet stays `"2024"`.
fn text_cell(row: &Row, columns: &[&str]) -> Option<String> {
    columns.iter().find_map(|column| match row.get(*column)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        }),
        _ => None,
    })
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

fn decimal_cell(row: &Row, column: &str, index: usize) -> Result<Decimal, IngestError> {
    let raw = match row.get(column) {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => return Err(invalid(index, format!("missing {column}"))),
    };
    parse_decimal(&raw).ok_or_else(|| invalid(index, format!("{column} is not a number: {raw:?}")))
}

fn required_text(row: &Row, columns: &[&str], index: usize) -> Result<String, IngestError> {
    text_cell(row, columns).ok_or_else(|| invalid(index, format!("missing {}", columns[columns.len() - 1])))
}

fn is_valid_year(year: &str) -> bool {
    year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit())
}

fn is_valid_month(month: &str) -> bool {
    month.len() == 6
        && month.bytes().all(|b| b.is_ascii_digit())
        && matches!(month[4..].parse::<u32>(), Ok(1..=12))
}

/// Rows are numbered from 1 in error messages, matching the sheet's data rows.
pub fn normalize_city_rows(rows: &[Row]) -> Result<Vec<CityStandard>, IngestError> {
    if rows.is_empty() {
        return Err(IngestError::Validation("upload contains no rows".into()));
    }

    let mut seen = HashSet::new();
    let mut standards = Vec::with_capacity(rows.len());

    for (offset, row) in rows.iter().enumerate() {
        let index = offset + 1;
        let city_name = required_text(row, CITY_NAME_COLUMNS, index)?;
        let year = required_text(row, &["year"], index)?;
        if !is_valid_year(&year) {
            return Err(invalid(index, format!("year must be four digits, got {year:?}")));
        }

        let base_min = decimal_cell(row, "base_min", index)?;
        let base_max = decimal_cell(row, "base_max", index)?;
        let rate = decimal_cell(row, "rate", index)?;

        if base_min < Decimal::ZERO || base_min > base_max {
            return Err(invalid(
                index,
                format!("base band {base_min}..{base_max} is not a valid range"),
            ));
        }
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(invalid(index, format!("rate {rate} must be between 0 and 1")));
        }
        if !seen.insert((city_name.clone(), year.clone())) {
            return Err(invalid(
                index,
                format!("duplicate standard for {city_name} in {year}"),
            ));
        }

        standards.push(CityStandard {
            city_name,
            year,
            base_min,
            base_max,
            rate,
        });
    }

    Ok(standards)
}

pub fn normalize_salary_rows(rows: &[Row]) -> Result<Vec<SalaryRecord>, IngestError> {
    if rows.is_empty() {
        return Err(IngestError::Validation("upload contains no rows".into()));
    }

    rows.iter()
        .enumerate()
        .map(|(offset, row)| {
            let index = offset + 1;
            let employee_id = required_text(row, &["employee_id"], index)?;
            let employee_name = required_text(row, &["employee_name"], index)?;
            let month = required_text(row, &["month"], index)?;
            if !is_valid_month(&month) {
                return Err(invalid(index, format!("month must be YYYYMM, got {month:?}")));
            }

            let salary_amount = decimal_cell(row, "salary_amount", index)?;
            if salary_amount < Decimal::ZERO {
                return Err(invalid(index, "salary_amount must not be negative"));
            }

            Ok(SalaryRecord {
                employee_id,
                employee_name,
                month,
                salary_amount,
            })
        })
        .collect()
}
