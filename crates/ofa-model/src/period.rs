//! Reporting periods.
//!
//! A run is identified by the date its monthly extracts were cut
//! (`YYYY-MM-DD`); the data inside describes the calendar month of that date.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::{OfaError, Result};

const PERIOD_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period(NaiveDate);

impl Period {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Builds a period from its components, rejecting impossible dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| OfaError::InvalidPeriod {
                value: format!("{year:04}-{month:02}-{day:02}"),
            })
    }

    pub fn parse(value: &str) -> Result<Self> {
        NaiveDate::parse_from_str(value.trim(), PERIOD_FORMAT)
            .map(Self)
            .map_err(|_| OfaError::InvalidPeriod {
                value: value.to_string(),
            })
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    pub fn day(self) -> u32 {
        self.0.day()
    }

    /// Number of calendar days in the period's month.
    pub fn days_in_month(self) -> u32 {
        let (next_year, next_month) = if self.month() == 12 {
            (self.year() + 1, 1)
        } else {
            (self.year(), self.month() + 1)
        };
        let first = NaiveDate::from_ymd_opt(self.year(), self.month(), 1);
        let next = NaiveDate::from_ymd_opt(next_year, next_month, 1);
        match (first, next) {
            (Some(first), Some(next)) => (next - first).num_days() as u32,
            _ => 30,
        }
    }

    /// First month of the quarter containing this period (1, 4, 7 or 10).
    pub fn quarter_start_month(self) -> u32 {
        ((self.month() - 1) / 3) * 3 + 1
    }

    /// The same day in the first month of the quarter.
    ///
    /// Every day of month used by the extract calendar exists in all months,
    /// so a failure only happens for days 29-31 and falls back to the 1st.
    pub fn quarter_start(self) -> Self {
        let month = self.quarter_start_month();
        NaiveDate::from_ymd_opt(self.year(), month, self.day())
            .or_else(|| NaiveDate::from_ymd_opt(self.year(), month, 1))
            .map_or(self, Self)
    }

    /// The period `weeks` weeks earlier.
    pub fn weeks_before(self, weeks: u32) -> Self {
        self.0
            .checked_sub_signed(TimeDelta::weeks(i64::from(weeks)))
            .map_or(self, Self)
    }

    /// Month key as written in the extracts' period column (`YYYY-MM`).
    pub fn month_key(self) -> String {
        format!("{:04}-{:02}", self.year(), self.month())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(PERIOD_FORMAT))
    }
}

impl FromStr for Period {
    type Err = OfaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Period {
    type Error = OfaError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Period> for String {
    fn from(value: Period) -> Self {
        value.to_string()
    }
}
