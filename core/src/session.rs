//! Dashboard session: owns the combined table and the user's filters.
//!
//! The presentation layer holds one DashboardSession, mutates its
//! FilterState in response to widget changes and calls render() after
//! each change. The table itself is never modified by filtering.

use crate::{
    palette::SourcePalette,
    pipeline::{self, Aggregation},
    record::{AggregatedSourceRecord, AggregatedTotalRecord, CombinedRecord},
    selection::SelectionState,
    summary::{self, DashboardSummary, SortColumn, SortOrder, SourceBreakdown},
    types::{DateRange, Granularity, LeadSource, Period},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub range:       DateRange,
    pub granularity: Granularity,
    pub selection:   SelectionState,
    #[serde(default)]
    pub sort:        (SortColumn, SortOrder),
}

/// Everything the presentation layer draws for one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub range:            DateRange,
    pub granularity:      Granularity,
    pub selected_sources: Vec<LeadSource>,
    pub summary:          DashboardSummary,
    /// Sorted per the filter's sort setting.
    pub by_source:        Vec<AggregatedSourceRecord>,
    pub totals:           Vec<AggregatedTotalRecord>,
    pub breakdown:        Vec<SourceBreakdown>,
    pub colors:           BTreeMap<LeadSource, String>,
}

pub struct DashboardSession {
    table:      Vec<CombinedRecord>,
    palette:    SourcePalette,
    full_range: Option<DateRange>,
    pub filter: FilterState,
}

impl DashboardSession {
    /// Start with the whole table in range, daily buckets and every source selected.
    pub fn new(table: Vec<CombinedRecord>) -> Self {
        let sources = distinct_sources(&table);
        let full_range = DateRange::spanning(table.iter().map(|r| r.period));
        let filter = FilterState {
            range:       full_range.unwrap_or_else(|| DateRange::new(Period::MIN, Period::MIN)),
            granularity: Granularity::Daily,
            selection:   SelectionState::new(sources.iter().cloned()),
            sort:        (SortColumn::Bucket, SortOrder::Ascending),
        };
        log::debug!(
            "session opened: {} rows, {} sources, range {:?}",
            table.len(),
            sources.len(),
            full_range
        );
        Self {
            palette: SourcePalette::new(sources),
            table,
            full_range,
            filter,
        }
    }

    pub fn table(&self) -> &[CombinedRecord] {
        &self.table
    }

    /// min..max period of the loaded table, None if it is empty.
    pub fn full_range(&self) -> Option<DateRange> {
        self.full_range
    }

    pub fn palette(&self) -> &SourcePalette {
        &self.palette
    }

    pub fn set_range(&mut self, start: Period, end: Period) {
        self.filter.range = DateRange::new(start, end);
    }

    pub fn set_granularity(&mut self, granularity: Granularity) {
        self.filter.granularity = granularity;
    }

    pub fn set_sort(&mut self, column: SortColumn, order: SortOrder) {
        self.filter.sort = (column, order);
    }

    pub fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.filter.selection
    }

    /// Swap in a freshly loaded table. The source selection carries over;
    /// the date range resets to the new table's span.
    pub fn replace_table(&mut self, table: Vec<CombinedRecord>) {
        let sources = distinct_sources(&table);
        self.filter.selection.rebase(sources.iter().cloned());
        self.palette = SourcePalette::new(sources);
        self.full_range = DateRange::spanning(table.iter().map(|r| r.period));
        if let Some(range) = self.full_range {
            self.filter.range = range;
        }
        self.table = table;
    }

    /// Run the pipeline for the current filters.
    pub fn aggregate(&self) -> Aggregation {
        pipeline::aggregate(
            &self.table,
            self.filter.range,
            self.filter.granularity,
            &self.filter.selection.selected(),
        )
    }

    pub fn render(&self) -> DashboardView {
        let selected = self.filter.selection.selected();
        let Aggregation { mut by_source, totals } = self.aggregate();
        let (column, order) = self.filter.sort;
        summary::sort_source_rows(&mut by_source, column, order);

        DashboardView {
            range:            self.filter.range,
            granularity:      self.filter.granularity,
            summary:          DashboardSummary::from_totals(&totals),
            breakdown:        summary::source_breakdown(&by_source),
            colors:           self.palette.subset(&selected),
            selected_sources: selected,
            by_source,
            totals,
        }
    }
}

fn distinct_sources(table: &[CombinedRecord]) -> Vec<LeadSource> {
    table
        .iter()
        .map(|r| r.lead_source.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
