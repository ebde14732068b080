//! Calendar month keys for bucketing investment records.

use anyhow::{Result, bail};
use chrono::{Datelike, Local, NaiveDateTime};
use std::fmt::Display;
use std::str::FromStr;

/// Identifies one calendar month. Renders as `YYYY-MM`, so lexicographic
/// order of the rendered form equals chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            bail!("Invalid month number: {month}");
        }
        Ok(MonthKey { year, month })
    }

    /// The month a record belongs to, read from its effective timestamp.
    pub fn from_datetime(ts: &NaiveDateTime) -> Self {
        MonthKey {
            year: ts.year(),
            month: ts.month(),
        }
    }

    /// The current calendar month from the process wall clock. Distinct from
    /// the latest data-bearing month: the dashboard shows an empty section
    /// for this month until its first record arrives.
    pub fn current() -> Self {
        let now = Local::now();
        MonthKey {
            year: now.year(),
            month: now.month(),
        }
    }

    /// Calendar predecessor (January rolls back to December).
    pub fn pred(&self) -> Self {
        if self.month == 1 {
            MonthKey {
                year: self.year - 1,
                month: 12,
            }
        } else {
            MonthKey {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((year, month)) = s.split_once('-') else {
            bail!("Invalid month key (expected YYYY-MM): {s}");
        };
        let year: i32 = year
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid year in month key: {s}"))?;
        let month: u32 = month
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid month in month key: {s}"))?;
        MonthKey::new(year, month)
    }
}
