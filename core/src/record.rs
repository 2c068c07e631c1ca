//! Row types for every table in the pipeline.
//!
//! Raw tables (leads, sales) carry the CSV column names as serde renames,
//! so the same structs read and write the exported files.

use crate::types::{LeadSource, Period};
use serde::{Deserialize, Serialize};

/// Premium per lead. Defined as 0 when there are no leads.
pub fn premium_per_lead(premium: f64, lead_count: u64) -> f64 {
    if lead_count == 0 {
        0.0
    } else {
        premium / lead_count as f64
    }
}

/// Sales per lead. Defined as 0 when there are no leads.
pub fn close_rate(sales: u64, lead_count: u64) -> f64 {
    if lead_count == 0 {
        0.0
    } else {
        sales as f64 / lead_count as f64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeadRecord {
    #[serde(rename = "PERIOD", with = "period_column")]
    pub period: Period,
    #[serde(rename = "LEAD_SOURCE")]
    pub lead_source: LeadSource,
    #[serde(rename = "LEAD_COUNT")]
    pub lead_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalesRecord {
    #[serde(rename = "PERIOD", with = "period_column")]
    pub period: Period,
    #[serde(rename = "LEAD_SOURCE")]
    pub lead_source: LeadSource,
    #[serde(rename = "SOURCE_SALES")]
    pub sales: u64,
    #[serde(rename = "SOURCE_PREMIUM")]
    pub premium: f64,
}

/// One (period, lead_source) row of the outer-joined leads and sales.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CombinedRecord {
    pub period:      Period,
    pub lead_source: LeadSource,
    pub lead_count:  u64,
    pub sales:       u64,
    pub premium:     f64,
}

impl CombinedRecord {
    pub fn key(&self) -> (Period, &str) {
        (self.period, self.lead_source.as_str())
    }

    pub fn lead_part(&self) -> LeadRecord {
        LeadRecord {
            period:      self.period,
            lead_source: self.lead_source.clone(),
            lead_count:  self.lead_count,
        }
    }

    pub fn sales_part(&self) -> SalesRecord {
        SalesRecord {
            period:      self.period,
            lead_source: self.lead_source.clone(),
            sales:       self.sales,
            premium:     self.premium,
        }
    }
}

/// Sums for one (bucket, source) group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregatedSourceRecord {
    pub bucket:      Period,
    pub lead_source: LeadSource,
    pub lead_count:  u64,
    pub sales:       u64,
    pub premium:     f64,
    /// Premium per lead.
    pub psl:         f64,
}

/// Sums for one bucket across every selected source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregatedTotalRecord {
    pub bucket:     Period,
    pub lead_count: u64,
    pub sales:      u64,
    pub premium:    f64,
    pub psl:        f64,
}

/// Running sums shared by both aggregation levels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Totals {
    pub lead_count: u64,
    pub sales:      u64,
    pub premium:    f64,
}

impl Totals {
    pub fn add(&mut self, lead_count: u64, sales: u64, premium: f64) {
        self.lead_count = self.lead_count.saturating_add(lead_count);
        self.sales = self.sales.saturating_add(sales);
        self.premium += premium;
    }

    pub fn psl(&self) -> f64 {
        premium_per_lead(self.premium, self.lead_count)
    }
}

mod period_column {
    use crate::types::{parse_period, Period, PERIOD_FORMAT};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(period: &Period, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&period.format(PERIOD_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Period, D::Error> {
        let raw = String::deserialize(d)?;
        parse_period(&raw).map_err(|e| D::Error::custom(format!("bad PERIOD '{raw}': {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios_are_zero_without_leads() {
        assert_eq!(premium_per_lead(500.0, 0), 0.0);
        assert_eq!(close_rate(3, 0), 0.0);
        assert_eq!(premium_per_lead(500.0, 4), 125.0);
        assert_eq!(close_rate(1, 4), 0.25);
    }

    #[test]
    fn totals_saturate_instead_of_overflowing() {
        let mut t = Totals::default();
        t.add(u64::MAX, u64::MAX, 1.0);
        t.add(1, 1, 1.0);
        assert_eq!((t.lead_count, t.sales), (u64::MAX, u64::MAX));
        assert_eq!(t.premium, 2.0);
    }
}
