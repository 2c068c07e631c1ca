//! Filter & aggregation pipeline behind every dashboard view.
//!
//! STAGES (fixed order, every render):
//!   1. filter_by_date_range
//!   2. filter_by_sources
//!   3. aggregate_by_source_and_bucket
//!   4. aggregate_by_bucket
//!
//! RULES:
//!   - Every stage is a pure function of its inputs. No I/O, no globals.
//!   - Outputs are ordered by (bucket, source) / bucket. Any permutation of
//!     the same input rows produces the same output, float sums included.
//!   - PSL is 0 whenever the lead count is 0.

use crate::{
    record::{AggregatedSourceRecord, AggregatedTotalRecord, CombinedRecord, Totals},
    types::{DateRange, Granularity, LeadSource, Period},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Both result tables for one filter configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub by_source: Vec<AggregatedSourceRecord>,
    pub totals:    Vec<AggregatedTotalRecord>,
}

impl Aggregation {
    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty() && self.totals.is_empty()
    }
}

/// Rows with `start <= period <= end`. Empty when end precedes start.
pub fn filter_by_date_range(
    table: &[CombinedRecord],
    start: Period,
    end: Period,
) -> Vec<CombinedRecord> {
    let range = DateRange::new(start, end);
    if range.is_empty() {
        return Vec::new();
    }
    table
        .iter()
        .filter(|r| range.contains(r.period))
        .cloned()
        .collect()
}

/// Rows whose source is selected. An empty selection keeps nothing.
pub fn filter_by_sources<S: AsRef<str>>(
    table: &[CombinedRecord],
    selected: &[S],
) -> Vec<CombinedRecord> {
    let wanted: HashSet<&str> = selected.iter().map(AsRef::as_ref).collect();
    table
        .iter()
        .filter(|r| wanted.contains(r.lead_source.as_str()))
        .cloned()
        .collect()
}

/// Start of the bucket holding `date`.
pub fn bucket_period(date: Period, granularity: Granularity) -> Period {
    granularity.bucket_start(date)
}

/// Group by (bucket, source) and sum.
pub fn aggregate_by_source_and_bucket(
    table: &[CombinedRecord],
    granularity: Granularity,
) -> Vec<AggregatedSourceRecord> {
    // Summing in (bucket, source, period) order keeps float results
    // independent of the incoming row order.
    let mut rows: Vec<(Period, &CombinedRecord)> = table
        .iter()
        .map(|r| (bucket_period(r.period, granularity), r))
        .collect();
    rows.sort_by(|(ba, a), (bb, b)| {
        (ba, &a.lead_source, a.period).cmp(&(bb, &b.lead_source, b.period))
    });

    let mut groups: BTreeMap<(Period, &LeadSource), Totals> = BTreeMap::new();
    for (bucket, r) in rows {
        groups
            .entry((bucket, &r.lead_source))
            .or_default()
            .add(r.lead_count, r.sales, r.premium);
    }

    groups
        .into_iter()
        .map(|((bucket, source), t)| AggregatedSourceRecord {
            bucket,
            lead_source: source.clone(),
            lead_count: t.lead_count,
            sales: t.sales,
            premium: t.premium,
            psl: t.psl(),
        })
        .collect()
}

/// Group source-level rows by bucket alone and sum.
pub fn aggregate_by_bucket(source_agg: &[AggregatedSourceRecord]) -> Vec<AggregatedTotalRecord> {
    let mut rows: Vec<&AggregatedSourceRecord> = source_agg.iter().collect();
    rows.sort_by(|a, b| (a.bucket, &a.lead_source).cmp(&(b.bucket, &b.lead_source)));

    let mut groups: BTreeMap<Period, Totals> = BTreeMap::new();
    for r in rows {
        groups
            .entry(r.bucket)
            .or_default()
            .add(r.lead_count, r.sales, r.premium);
    }

    groups
        .into_iter()
        .map(|(bucket, t)| AggregatedTotalRecord {
            bucket,
            lead_count: t.lead_count,
            sales: t.sales,
            premium: t.premium,
            psl: t.psl(),
        })
        .collect()
}

/// Run every stage for one filter configuration.
pub fn aggregate<S: AsRef<str>>(
    table: &[CombinedRecord],
    range: DateRange,
    granularity: Granularity,
    selected: &[S],
) -> Aggregation {
    let in_range = filter_by_date_range(table, range.start, range.end);
    let filtered = filter_by_sources(&in_range, selected);
    let by_source = aggregate_by_source_and_bucket(&filtered, granularity);
    let totals = aggregate_by_bucket(&by_source);

    log::debug!(
        "aggregate: {} rows -> {} in range -> {} selected -> {} source buckets, {} {} buckets",
        table.len(),
        in_range.len(),
        filtered.len(),
        by_source.len(),
        totals.len(),
        granularity
    );
    Aggregation { by_source, totals }
}
