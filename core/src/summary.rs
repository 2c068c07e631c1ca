//! Headline metrics, per-source breakout and table ordering.

use crate::{
    error::DashError,
    record::{close_rate, premium_per_lead, AggregatedSourceRecord, AggregatedTotalRecord, Totals},
    types::LeadSource,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// The metric cards across the top of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_leads:   u64,
    pub total_sales:   u64,
    pub total_premium: f64,
    pub psl:           f64,
    pub close_rate:    f64,
    pub bucket_count:  usize,
}

impl DashboardSummary {
    pub fn from_totals(totals: &[AggregatedTotalRecord]) -> Self {
        let mut t = Totals::default();
        for r in totals {
            t.add(r.lead_count, r.sales, r.premium);
        }
        Self {
            total_leads:   t.lead_count,
            total_sales:   t.sales,
            total_premium: t.premium,
            psl:           t.psl(),
            close_rate:    close_rate(t.sales, t.lead_count),
            bucket_count:  totals.len(),
        }
    }
}

/// One source's totals over the whole filtered range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceBreakdown {
    pub lead_source: LeadSource,
    pub lead_count:  u64,
    pub sales:       u64,
    pub premium:     f64,
    pub psl:         f64,
    pub close_rate:  f64,
    /// Fraction of all selected leads from this source.
    pub lead_share:  f64,
}

/// Collapse bucketed rows into one row per source, ordered by name.
pub fn source_breakdown(by_source: &[AggregatedSourceRecord]) -> Vec<SourceBreakdown> {
    let mut per_source: BTreeMap<&str, Totals> = BTreeMap::new();
    for r in by_source {
        per_source
            .entry(r.lead_source.as_str())
            .or_default()
            .add(r.lead_count, r.sales, r.premium);
    }
    let all_leads: u64 = per_source.values().map(|t| t.lead_count).sum();

    per_source
        .into_iter()
        .map(|(source, t)| SourceBreakdown {
            lead_source: source.to_string(),
            lead_count:  t.lead_count,
            sales:       t.sales,
            premium:     t.premium,
            psl:         premium_per_lead(t.premium, t.lead_count),
            close_rate:  close_rate(t.sales, t.lead_count),
            lead_share:  if all_leads == 0 { 0.0 } else { t.lead_count as f64 / all_leads as f64 },
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    #[default]
    Bucket,
    Source,
    Leads,
    Sales,
    Premium,
    Psl,
}

impl std::str::FromStr for SortColumn {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bucket" | "period" => Ok(Self::Bucket),
            "source" | "lead_source" => Ok(Self::Source),
            "leads" | "lead_count" => Ok(Self::Leads),
            "sales" => Ok(Self::Sales),
            "premium" => Ok(Self::Premium),
            "psl" => Ok(Self::Psl),
            other => Err(DashError::InvalidConfig(format!("unknown sort column '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Sort table rows by `column`. Ties fall back to (bucket, source)
/// ascending, so the order is total regardless of direction.
pub fn sort_source_rows(rows: &mut [AggregatedSourceRecord], column: SortColumn, order: SortOrder) {
    rows.sort_by(|a, b| {
        let primary = match column {
            SortColumn::Bucket  => a.bucket.cmp(&b.bucket),
            SortColumn::Source  => a.lead_source.cmp(&b.lead_source),
            SortColumn::Leads   => a.lead_count.cmp(&b.lead_count),
            SortColumn::Sales   => a.sales.cmp(&b.sales),
            SortColumn::Premium => a.premium.total_cmp(&b.premium),
            SortColumn::Psl     => a.psl.total_cmp(&b.psl),
        };
        let primary = match order {
            SortOrder::Ascending  => primary,
            SortOrder::Descending => primary.reverse(),
        };
        primary.then_with(|| tie_break(a, b))
    });
}

fn tie_break(a: &AggregatedSourceRecord, b: &AggregatedSourceRecord) -> Ordering {
    (a.bucket, &a.lead_source).cmp(&(b.bucket, &b.lead_source))
}
