use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::SalaryRecord;

/// Which field identifies an employee when averaging salaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupingKey {
    /// Group by `employee_id`; the first name seen for an id is displayed.
    #[default]
    EmployeeId,
    /// Group by `employee_name`, merging distinct ids that share a name.
    EmployeeName,
}

impl GroupingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupingKey::EmployeeId => "employee_id",
            GroupingKey::EmployeeName => "employee_name",
        }
    }

    fn key_of<'a>(&self, record: &'a SalaryRecord) -> &'a str {
        match self {
            GroupingKey::EmployeeId => &record.employee_id,
            GroupingKey::EmployeeName => &record.employee_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown grouping key {0:?} (expected employee_id or employee_name)")]
pub struct UnknownGroupingKey(String);

impl FromStr for GroupingKey {
    type Err = UnknownGroupingKey;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "employee_id" | "id" => Ok(GroupingKey::EmployeeId),
            "employee_name" | "name" => Ok(GroupingKey::EmployeeName),
            other => Err(UnknownGroupingKey(other.to_string())),
        }
    }
}

/// Full-precision mean salary for one employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeAverage {
    pub employee_id: String,
    pub employee_name: String,
    pub record_count: usize,
    pub avg_salary: Decimal,
}

struct Group {
    employee_id: String,
    employee_name: String,
    total: Decimal,
    count: usize,
}

/// Mean `salary_amount` per employee, in order of each employee's first
/// appearance in `records`.
pub fn average_by_employee(records: &[SalaryRecord], key: GroupingKey) -> Vec<EmployeeAverage> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for record in records {
        let slot = *index.entry(key.key_of(record)).or_insert_with(|| {
            groups.push(Group {
                employee_id: record.employee_id.clone(),
                employee_name: record.employee_name.clone(),
                total: Decimal::ZERO,
                count: 0,
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.total += record.salary_amount;
        group.count += 1;
    }

    groups
        .into_iter()
        .map(|group| EmployeeAverage {
            avg_salary: group.total / Decimal::from(group.count),
            employee_id: group.employee_id,
            employee_name: group.employee_name,
            record_count: group.count,
        })
        .collect()
}
