//! Year-month values: `YYYY-MM` on input, `Mon YYYY` for display.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// End-date marker for entries that are still ongoing.
pub const PRESENT: &str = "Present";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("expected YYYY-MM, got '{0}'")]
    Malformed(String),

    #[error("expected a display date like 'Mar 2021', got '{0}'")]
    NotDisplay(String),
}

/// A calendar month. Stored as the first day of that month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    /// Parses the `YYYY-MM` form produced by month pickers.
    pub fn parse(input: &str) -> Result<Self, DateError> {
        let malformed = || DateError::Malformed(input.to_string());

        let (year, month) = input.split_once('-').ok_or_else(malformed)?;
        if year.len() != 4
            || month.len() != 2
            || !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }

        let year: i32 = year.parse().map_err(|_| malformed())?;
        let month: u32 = month.parse().map_err(|_| malformed())?;
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(YearMonth)
            .ok_or_else(malformed)
    }

    /// Parses the display form (`"Mar 2021"`) back into a month.
    pub fn from_display(input: &str) -> Result<Self, DateError> {
        NaiveDate::parse_from_str(&format!("01 {}", input.trim()), "%d %b %Y")
            .map(YearMonth)
            .map_err(|_| DateError::NotDisplay(input.to_string()))
    }

    /// `"Mar 2021"`
    pub fn display(&self) -> String {
        self.0.format("%b %Y").to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.0.year(), self.0.month())
    }
}
