//! Synthetic lead/sales generation.
//!
//! For every day in the configured range and every source, in config order:
//!   1. daily lead count from the active LeadModel
//!   2. sales ~ Binomial(leads, sales_rate)
//!   3. premium = sales × psl_base × Normal(1, premium_noise_sd), 2 dp, ≥ 0
//!
//! All draws for a source come from that source's own RNG stream,
//! so runs with the same seed are byte-identical.

use crate::{
    config::{GeneratorConfig, GeneratorModel, SourceConfig},
    error::DashResult,
    record::{CombinedRecord, LeadRecord, SalesRecord},
    rng::{RngBank, SourceRng},
    store,
    types::Period,
};
use chrono::Datelike;

/// Everything a LeadModel may condition on for one day.
#[derive(Debug, Clone, Copy)]
pub struct DayContext {
    pub date:     Period,
    /// Seasonal multiplier for the date's month.
    pub season:   f64,
    /// Position in the generated range, 0.0 on the first day and 1.0 on the last.
    pub progress: f64,
}

/// The contract every lead-volume model must fulfill.
pub trait LeadModel {
    fn name(&self) -> &'static str;

    /// Draw one source's lead count for one day.
    fn daily_leads(&self, source: &SourceConfig, day: &DayContext, rng: &mut SourceRng) -> u64;
}

/// Poisson around a seasonal mean, at least one lead per day.
pub struct PoissonModel;

impl LeadModel for PoissonModel {
    fn name(&self) -> &'static str { "poisson" }

    fn daily_leads(&self, source: &SourceConfig, day: &DayContext, rng: &mut SourceRng) -> u64 {
        let mean = source.leads_base / 30.0 * day.season;
        rng.poisson(mean).max(1)
    }
}

/// Normal around a seasonal mean that grows linearly over the range.
pub struct TrendModel {
    pub trend: f64,
    pub noise: f64,
}

impl LeadModel for TrendModel {
    fn name(&self) -> &'static str { "trend" }

    fn daily_leads(&self, source: &SourceConfig, day: &DayContext, rng: &mut SourceRng) -> u64 {
        let mean = source.leads_base / 30.0 * day.season * (1.0 + self.trend * day.progress);
        rng.normal(mean, mean * self.noise).round().max(0.0) as u64
    }
}

/// `1 + amplitude · sin((month − 3) · π / 6)`: trough in December, peak in June.
pub fn seasonal_multiplier(date: Period, amplitude: f64) -> f64 {
    let month = date.month() as f64;
    1.0 + amplitude * ((month - 3.0) * std::f64::consts::PI / 6.0).sin()
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// The two raw tables produced by one generation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedDataset {
    pub leads: Vec<LeadRecord>,
    pub sales: Vec<SalesRecord>,
}

impl GeneratedDataset {
    pub fn combined(&self) -> Vec<CombinedRecord> {
        store::outer_join(&self.leads, &self.sales)
    }
}

pub struct SyntheticGenerator {
    config: GeneratorConfig,
    model:  Box<dyn LeadModel>,
}

impl SyntheticGenerator {
    /// Build a generator using the model named in the config.
    pub fn new(config: GeneratorConfig) -> DashResult<Self> {
        let model: Box<dyn LeadModel> = match config.model {
            GeneratorModel::Poisson => Box::new(PoissonModel),
            GeneratorModel::Trend => Box::new(TrendModel {
                trend: config.trend,
                noise: config.volume_noise,
            }),
        };
        Self::with_model(config, model)
    }

    pub fn with_model(config: GeneratorConfig, model: Box<dyn LeadModel>) -> DashResult<Self> {
        config.validate()?;
        Ok(Self { config, model })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn model_name(&self) -> &'static str {
        self.model.name()
    }

    pub fn generate(&self) -> GeneratedDataset {
        let range = self.config.range();
        let bank = RngBank::new(self.config.seed);
        let mut rngs: Vec<SourceRng> = self
            .config
            .sources
            .iter()
            .enumerate()
            .map(|(slot, s)| bank.for_source(slot, &s.name))
            .collect();

        let span = range.num_days().saturating_sub(1).max(1) as f64;
        let rows = range.num_days() as usize * self.config.sources.len();
        let mut dataset = GeneratedDataset {
            leads: Vec::with_capacity(rows),
            sales: Vec::with_capacity(rows),
        };
        let mut lead_totals = vec![0u64; rngs.len()];

        for (offset, date) in range.days().enumerate() {
            let day = DayContext {
                date,
                season: seasonal_multiplier(date, self.config.seasonal_amplitude),
                progress: offset as f64 / span,
            };

            for ((source, rng), total) in self
                .config
                .sources
                .iter()
                .zip(rngs.iter_mut())
                .zip(lead_totals.iter_mut())
            {
                let lead_count = self.model.daily_leads(source, &day, rng);
                *total += lead_count;
                let sales = rng.binomial(lead_count, source.sales_rate);
                let noise = rng.normal(1.0, self.config.premium_noise_sd);
                let premium = if sales > 0 {
                    round_cents(sales as f64 * source.psl_base * noise).max(0.0)
                } else {
                    0.0
                };

                dataset.leads.push(LeadRecord {
                    period: date,
                    lead_source: source.name.clone(),
                    lead_count,
                });
                dataset.sales.push(SalesRecord {
                    period: date,
                    lead_source: source.name.clone(),
                    sales,
                    premium,
                });
            }
        }

        for (rng, total) in rngs.iter().zip(&lead_totals) {
            log::debug!("source {}: {} leads", rng.name, total);
        }
        log::info!(
            "generated {} lead rows and {} sales rows ({} model, seed {}, {}..{})",
            dataset.leads.len(),
            dataset.sales.len(),
            self.model.name(),
            bank.master_seed(),
            range.start,
            range.end
        );
        dataset
    }
}
