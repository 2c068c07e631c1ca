//! Dashboard session tests: filter state, persistence and the view model.

use chrono::NaiveDate;
use leadboard_core::{
    config::GeneratorConfig,
    generator::SyntheticGenerator,
    palette::PALETTE,
    record::CombinedRecord,
    session::DashboardSession,
    summary::{SortColumn, SortOrder},
    types::{DateRange, Granularity},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn table(start: NaiveDate, end: NaiveDate) -> Vec<CombinedRecord> {
    let config = GeneratorConfig { start, end, ..GeneratorConfig::default() };
    SyntheticGenerator::new(config).unwrap().generate().combined()
}

fn quarter_session() -> DashboardSession {
    DashboardSession::new(table(date(2023, 1, 1), date(2023, 3, 31)))
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// A fresh session covers the whole table with every source selected.
#[test]
fn default_view_covers_everything() {
    let session = quarter_session();
    let view = session.render();

    assert_eq!(view.range, DateRange::new(date(2023, 1, 1), date(2023, 3, 31)));
    assert_eq!(view.granularity, Granularity::Daily);
    assert_eq!(view.selected_sources.len(), 12);
    assert_eq!(view.totals.len(), 90);
    assert_eq!(view.colors.len(), 12);

    let leads: u64 = session.table().iter().map(|r| r.lead_count).sum();
    let sales: u64 = session.table().iter().map(|r| r.sales).sum();
    assert_eq!(view.summary.total_leads, leads);
    assert_eq!(view.summary.total_sales, sales);
    assert_eq!(view.summary.bucket_count, 90);
    assert!(view.summary.psl > 0.0);
    assert!(view.summary.close_rate > 0.0 && view.summary.close_rate < 1.0);
}

/// Clearing every source renders an empty but well-formed view.
#[test]
fn clear_all_renders_empty_view() {
    let mut session = quarter_session();
    session.selection_mut().clear_all();
    let view = session.render();

    assert!(view.selected_sources.is_empty());
    assert!(view.by_source.is_empty());
    assert!(view.totals.is_empty());
    assert!(view.breakdown.is_empty());
    assert!(view.colors.is_empty());
    assert_eq!(view.summary.total_leads, 0);
    assert_eq!(view.summary.psl, 0.0);

    session.selection_mut().select_all();
    assert_eq!(session.render().selected_sources.len(), 12);
}

/// Monthly buckets over a quarter, restricted to two sources.
#[test]
fn filters_combine() {
    let mut session = quarter_session();
    session.set_granularity(Granularity::Monthly);
    session.set_range(date(2023, 2, 1), date(2023, 3, 31));
    session.selection_mut().set(["Google", "Roku"]);
    let view = session.render();

    let buckets: Vec<NaiveDate> = view.totals.iter().map(|t| t.bucket).collect();
    assert_eq!(buckets, vec![date(2023, 2, 1), date(2023, 3, 1)]);
    assert_eq!(view.by_source.len(), 4);
    assert_eq!(view.breakdown.len(), 2);
    assert_eq!(
        view.colors.keys().cloned().collect::<Vec<_>>(),
        vec!["Google".to_string(), "Roku".to_string()]
    );
}

/// Colors are fixed per source no matter what is selected.
#[test]
fn colors_are_stable_across_selection_changes() {
    let mut session = quarter_session();
    let before = session.render().colors["Youtube"].clone();
    session.selection_mut().set(["Youtube"]);
    let after = session.render().colors["Youtube"].clone();
    assert_eq!(before, after);
    assert!(PALETTE.contains(&before.as_str()));
}

/// The selection survives a reload of the underlying data.
#[test]
fn selection_persists_across_table_reload() {
    let mut session = quarter_session();
    session.selection_mut().set(["O2C", "VOXR"]);
    session.set_granularity(Granularity::Weekly);

    session.replace_table(table(date(2024, 1, 1), date(2024, 1, 31)));
    let view = session.render();

    assert_eq!(view.selected_sources, vec!["O2C".to_string(), "VOXR".to_string()]);
    assert_eq!(view.range, DateRange::new(date(2024, 1, 1), date(2024, 1, 31)));
    assert_eq!(view.granularity, Granularity::Weekly);
}

/// An explicitly cleared selection stays cleared after a reload.
#[test]
fn cleared_selection_survives_table_reload() {
    let mut session = quarter_session();
    session.selection_mut().clear_all();
    session.replace_table(table(date(2024, 1, 1), date(2024, 1, 31)));
    let view = session.render();

    assert!(view.selected_sources.is_empty());
    assert!(view.totals.is_empty());
    assert_eq!(session.filter.selection.available().len(), 12);
}

/// Table rows honor the sort setting; the totals series stays chronological.
#[test]
fn table_sorts_by_requested_column() {
    let mut session = quarter_session();
    session.set_granularity(Granularity::Weekly);
    session.set_sort(SortColumn::Psl, SortOrder::Descending);
    let view = session.render();

    assert!(view.by_source.windows(2).all(|w| w[0].psl >= w[1].psl));
    assert!(view.totals.windows(2).all(|w| w[0].bucket < w[1].bucket));
}

#[test]
fn empty_table_renders_empty_view() {
    let session = DashboardSession::new(Vec::new());
    assert!(session.full_range().is_none());
    let view = session.render();
    assert!(view.totals.is_empty());
    assert!(view.selected_sources.is_empty());
}

/// The view model serializes for the presentation layer.
#[test]
fn view_serializes_to_json() {
    let view = quarter_session().render();
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["granularity"], "daily");
    assert_eq!(json["range"]["start"], "2023-01-01");
    assert!(json["totals"].as_array().unwrap().len() == 90);
}
