//! Time horizon selection and date-range arithmetic.

use crate::types::DateRange;
use crate::{Error, Result};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lookback window offered by the dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Horizon {
    /// January 1 of the current year to today
    #[default]
    #[serde(rename = "YTD")]
    Ytd,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "3Y")]
    ThreeYears,
    #[serde(rename = "5Y")]
    FiveYears,
}

impl Horizon {
    /// All horizons in selector order.
    pub const ALL: [Horizon; 4] = [
        Horizon::Ytd,
        Horizon::OneYear,
        Horizon::ThreeYears,
        Horizon::FiveYears,
    ];

    /// Short code used on the command line and in chart titles.
    pub fn code(&self) -> &'static str {
        match self {
            Horizon::Ytd => "YTD",
            Horizon::OneYear => "1Y",
            Horizon::ThreeYears => "3Y",
            Horizon::FiveYears => "5Y",
        }
    }

    /// Inclusive date range ending on `today`.
    ///
    /// Year offsets are calendar offsets; Feb 29 maps to Feb 28 in a non-leap
    /// target year.
    pub fn date_range(&self, today: NaiveDate) -> Result<DateRange> {
        let start = match self {
            Horizon::Ytd => NaiveDate::from_ymd_opt(today.year(), 1, 1),
            Horizon::OneYear => years_before(today, 1),
            Horizon::ThreeYears => years_before(today, 3),
            Horizon::FiveYears => years_before(today, 5),
        }
        .ok_or_else(|| Error::InvalidRequest(format!("no {} start date for {today}", self)))?;

        DateRange::new(start, today)
    }
}

fn years_before(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    date.checked_sub_months(Months::new(12 * years))
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Horizon {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "YTD" => Ok(Horizon::Ytd),
            "1Y" => Ok(Horizon::OneYear),
            "3Y" => Ok(Horizon::ThreeYears),
            "5Y" => Ok(Horizon::FiveYears),
            other => Err(Error::InvalidRequest(format!(
                "unknown horizon '{other}' (expected YTD, 1Y, 3Y or 5Y)"
            ))),
        }
    }
}
