//! Synthetic generator tests: shape, bounds and model behavior.

use chrono::{Datelike, NaiveDate};
use leadboard_core::{
    config::{GeneratorConfig, GeneratorModel, SourceConfig},
    generator::SyntheticGenerator,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn week_config() -> GeneratorConfig {
    GeneratorConfig {
        start: date(2023, 1, 1),
        end: date(2023, 1, 7),
        ..GeneratorConfig::default()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// One lead row and one sales row per (date, source), dates in order.
#[test]
fn emits_one_row_per_day_and_source() {
    let config = week_config();
    let sources = config.sources.len();
    let dataset = SyntheticGenerator::new(config).unwrap().generate();

    assert_eq!(dataset.leads.len(), 7 * sources);
    assert_eq!(dataset.sales.len(), 7 * sources);
    assert_eq!(dataset.leads[0].period, date(2023, 1, 1));
    assert_eq!(dataset.leads.last().unwrap().period, date(2023, 1, 7));

    for (l, s) in dataset.leads.iter().zip(&dataset.sales) {
        assert_eq!((l.period, &l.lead_source), (s.period, &s.lead_source));
    }
}

/// Sales never exceed leads, premium is never negative, and a day
/// without sales carries no premium.
#[test]
fn sales_and_premium_respect_bounds() {
    let config = GeneratorConfig {
        start: date(2023, 1, 1),
        end: date(2023, 6, 30),
        ..GeneratorConfig::default()
    };
    let dataset = SyntheticGenerator::new(config).unwrap().generate();

    for (l, s) in dataset.leads.iter().zip(&dataset.sales) {
        assert!(l.lead_count >= 1, "poisson model floors leads at 1: {l:?}");
        assert!(s.sales <= l.lead_count, "sales above leads: {l:?} {s:?}");
        assert!(s.premium >= 0.0, "negative premium: {s:?}");
        if s.sales == 0 {
            assert_eq!(s.premium, 0.0, "premium without sales: {s:?}");
        }
        let cents = s.premium * 100.0;
        assert!((cents - cents.round()).abs() < 1e-6, "premium not in cents: {s:?}");
    }
}

/// Over two full years seasonality averages out, so a source's mean daily
/// volume sits near leads_base / 30.
#[test]
fn poisson_volume_tracks_leads_base() {
    let config = GeneratorConfig::default();
    let days = config.range().num_days() as f64;
    let dataset = SyntheticGenerator::new(config).unwrap().generate();

    let google: u64 = dataset
        .leads
        .iter()
        .filter(|l| l.lead_source == "Google")
        .map(|l| l.lead_count)
        .sum();
    let mean = google as f64 / days;
    assert!((mean - 10.0).abs() < 0.5, "Google mean daily leads {mean:.2}, expected ~10");
}

/// Conversion rate over a long run lands near the configured sales_rate.
#[test]
fn conversion_tracks_sales_rate() {
    let dataset = SyntheticGenerator::new(GeneratorConfig::default()).unwrap().generate();
    let (leads, sales) = dataset
        .leads
        .iter()
        .zip(&dataset.sales)
        .filter(|(l, _)| l.lead_source == "O2C")
        .fold((0u64, 0u64), |(a, b), (l, s)| (a + l.lead_count, b + s.sales));
    let rate = sales as f64 / leads as f64;
    assert!((rate - 0.20).abs() < 0.02, "O2C close rate {rate:.3}, expected ~0.20");
}

/// The trend model grows volume across the range.
#[test]
fn trend_model_grows_volume() {
    let config = GeneratorConfig {
        model: GeneratorModel::Trend,
        trend: 1.0,
        ..GeneratorConfig::default()
    };
    let generator = SyntheticGenerator::new(config).unwrap();
    assert_eq!(generator.model_name(), "trend");
    let dataset = generator.generate();

    let january = |year: i32| -> u64 {
        dataset
            .leads
            .iter()
            .filter(|l| l.period.year() == year && l.period.month() == 1)
            .map(|l| l.lead_count)
            .sum()
    };
    let (first, second) = (january(2023), january(2024));
    assert!(
        second as f64 > first as f64 * 1.3,
        "expected January 2024 ({second}) well above January 2023 ({first})"
    );
}

/// Invalid configs are rejected before any generation happens.
#[test]
fn invalid_config_is_rejected() {
    let config = GeneratorConfig {
        start: date(2023, 2, 1),
        end: date(2023, 1, 1),
        ..GeneratorConfig::default()
    };
    assert!(SyntheticGenerator::new(config).is_err());

    let config = GeneratorConfig {
        sources: vec![SourceConfig::new("Google", 300.0, 195.0, -0.1)],
        ..week_config()
    };
    assert!(SyntheticGenerator::new(config).is_err());
}
