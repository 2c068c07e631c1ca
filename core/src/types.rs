//! Shared primitive types used across the entire dashboard pipeline.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DashError;

/// A calendar day. Raw data is always daily.
pub type Period = NaiveDate;

/// A categorical lead origin channel, e.g. "Google".
pub type LeadSource = String;

/// Wire format for PERIOD columns.
pub const PERIOD_FORMAT: &str = "%Y-%m-%d";

/// Time coarsening applied before aggregation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Daily   => "daily",
            Self::Weekly  => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Start of the bucket containing `date`.
    /// Weekly buckets start on Monday.
    pub fn bucket_start(&self, date: Period) -> Period {
        match self {
            Self::Daily => date,
            Self::Weekly => {
                let back = date.weekday().num_days_from_monday() as u64;
                date - chrono::Days::new(back)
            }
            // Day 1 exists in every month.
            Self::Monthly => date.with_day(1).unwrap_or(date),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Granularity {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" | "d"     => Ok(Self::Daily),
            "weekly" | "week" | "w"   => Ok(Self::Weekly),
            "monthly" | "month" | "m" => Ok(Self::Monthly),
            other => Err(DashError::InvalidConfig(format!("unknown granularity '{other}'"))),
        }
    }
}

/// Inclusive calendar range. A range whose end precedes its start is empty.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: Period,
    pub end:   Period,
}

impl DateRange {
    pub fn new(start: Period, end: Period) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn contains(&self, date: Period) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days covered, 0 when empty.
    pub fn num_days(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            (self.end - self.start).num_days() as u64 + 1
        }
    }

    /// Every day in the range, in order.
    pub fn days(&self) -> impl Iterator<Item = Period> + '_ {
        self.start
            .iter_days()
            .take_while(move |d| *d <= self.end)
    }

    /// Smallest range covering every period yielded, None when there are none.
    pub fn spanning<I>(periods: I) -> Option<Self>
    where
        I: IntoIterator<Item = Period>,
    {
        periods.into_iter().fold(None, |acc, p| match acc {
            None => Some(Self::new(p, p)),
            Some(r) => Some(Self::new(r.start.min(p), r.end.max(p))),
        })
    }
}

/// Parse a PERIOD cell. Accepts `YYYY-MM-DD` with an optional trailing time.
pub fn parse_period(raw: &str) -> Result<Period, chrono::ParseError> {
    let trimmed = raw.trim();
    let date_part = trimmed
        .split([' ', 'T'])
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, PERIOD_FORMAT)
}
