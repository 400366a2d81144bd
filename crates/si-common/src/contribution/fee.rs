use rust_decimal::{Decimal, RoundingStrategy};

use crate::CityStandard;

/// Round half-up to cents.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Clamp `avg_salary` into `[base_min, base_max]`.
pub fn clamp_to_band(avg_salary: Decimal, standard: &CityStandard) -> Decimal {
    if avg_salary < standard.base_min {
        standard.base_min
    } else if avg_salary > standard.base_max {
        standard.base_max
    } else {
        avg_salary
    }
}

pub fn company_fee(contribution_base: Decimal, standard: &CityStandard) -> Decimal {
    contribution_base * standard.rate
}
