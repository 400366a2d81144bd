//! Contribution calculation: period selection, per-employee averaging,
//! clamping against a city's base band and applying its rate.

pub mod aggregate;
pub mod calculator;
pub mod fee;
pub mod period;

pub use aggregate::{EmployeeAverage, GroupingKey, average_by_employee};
pub use calculator::{
    CalculationError, CalculationOutcome, CalculatorConfig, ContributionCalculator,
    compute_contributions,
};
pub use fee::{clamp_to_band, company_fee, round_money};
pub use period::{MonthRange, PeriodError, PeriodSelector};
