use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::store::SalaryFilter;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    #[error("year is required")]
    MissingYear,
    #[error("year must be four digits, got {0:?}")]
    InvalidYear(String),
    #[error("month range must look like MM-MM, got {0:?}")]
    MalformedMonthRange(String),
    #[error("month {0} is outside 1..=12")]
    MonthOutOfRange(u32),
    #[error("month range starts after it ends: {start:02}-{end:02}")]
    ReversedMonthRange { start: u32, end: u32 },
}

/// Inclusive range of calendar months within one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    start: u32,
    end: u32,
}

impl MonthRange {
    pub fn new(start: u32, end: u32) -> Result<Self, PeriodError> {
        for month in [start, end] {
            if !(1..=12).contains(&month) {
                return Err(PeriodError::MonthOutOfRange(month));
            }
        }
        if start > end {
            return Err(PeriodError::ReversedMonthRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn contains(&self, month: u32) -> bool {
        (self.start..=self.end).contains(&month)
    }
}

fn parse_month_token(token: &str, raw: &str) -> Result<u32, PeriodError> {
    let token = token.trim();
    if token.is_empty() || token.len() > 2 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PeriodError::MalformedMonthRange(raw.to_string()));
    }
    token
        .parse()
        .map_err(|_| PeriodError::MalformedMonthRange(raw.to_string()))
}

impl FromStr for MonthRange {
    type Err = PeriodError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (start, end) = raw
            .split_once('-')
            .ok_or_else(|| PeriodError::MalformedMonthRange(raw.to_string()))?;
        MonthRange::new(parse_month_token(start, raw)?, parse_month_token(end, raw)?)
    }
}

impl fmt::Display for MonthRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.start, self.end)
    }
}

/// The salary period a calculation covers: a whole year, or a month range
/// inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodSelector {
    year: String,
    months: Option<MonthRange>,
}

impl PeriodSelector {
    /// An empty or whitespace-only `month_range` selects the whole year.
    pub fn new(year: &str, month_range: Option<&str>) -> Result<Self, PeriodError> {
        let year = year.trim();
        if year.is_empty() {
            return Err(PeriodError::MissingYear);
        }
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PeriodError::InvalidYear(year.to_string()));
        }

        let months = month_range
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(str::parse::<MonthRange>)
            .transpose()?;

        Ok(Self {
            year: year.to_string(),
            months,
        })
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn months(&self) -> Option<MonthRange> {
        self.months
    }

    /// Zero-padded `MM-MM` label stored with each result, or `None` for a
    /// whole-year run.
    pub fn month_label(&self) -> Option<String> {
        self.months.map(|range| range.to_string())
    }

    /// `YYYYMM` bounds compare correctly as strings because both share the
    /// year prefix and months are zero-padded.
    pub fn salary_filter(&self) -> SalaryFilter {
        match self.months {
            None => SalaryFilter::Year(self.year.clone()),
            Some(range) => SalaryFilter::MonthBetween {
                start: format!("{}{:02}", self.year, range.start),
                end: format!("{}{:02}", self.year, range.end),
            },
        }
    }
}
