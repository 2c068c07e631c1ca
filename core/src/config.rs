use crate::{
    error::{DashError, DashResult},
    types::{DateRange, Period},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_LEADS_FILE: &str = "leads_data.csv";
pub const DEFAULT_SALES_FILE: &str = "sales_data.csv";

/// Per-source statistical parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    pub name: String,
    /// Expected leads per 30 days before seasonality.
    pub leads_base: f64,
    /// Average premium per sale.
    pub psl_base: f64,
    /// Probability a lead converts to a sale.
    pub sales_rate: f64,
}

impl SourceConfig {
    pub fn new(name: &str, leads_base: f64, psl_base: f64, sales_rate: f64) -> Self {
        Self {
            name: name.into(),
            leads_base,
            psl_base,
            sales_rate,
        }
    }
}

/// Which statistical model drives daily lead volume.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorModel {
    /// Poisson lead counts, binomial conversions.
    #[default]
    Poisson,
    /// Normal lead counts around a linearly trending mean.
    Trend,
}

impl std::str::FromStr for GeneratorModel {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "poisson" => Ok(Self::Poisson),
            "trend"   => Ok(Self::Trend),
            other => Err(DashError::InvalidConfig(format!("unknown generator model '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratorConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    pub start: Period,
    pub end: Period,
    #[serde(default)]
    pub model: GeneratorModel,
    /// Peak deviation of the monthly sine seasonality.
    #[serde(default = "default_seasonal_amplitude")]
    pub seasonal_amplitude: f64,
    /// Standard deviation of the multiplicative premium noise.
    #[serde(default = "default_premium_noise_sd")]
    pub premium_noise_sd: f64,
    /// Fractional growth across the whole range (trend model only).
    #[serde(default = "default_trend")]
    pub trend: f64,
    /// Lead-count noise as a fraction of the daily mean (trend model only).
    #[serde(default = "default_volume_noise")]
    pub volume_noise: f64,
    pub sources: Vec<SourceConfig>,
}

fn default_seed() -> u64 { DEFAULT_SEED }
fn default_seasonal_amplitude() -> f64 { 0.15 }
fn default_premium_noise_sd() -> f64 { 0.12 }
fn default_trend() -> f64 { 0.25 }
fn default_volume_noise() -> f64 { 0.2 }

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
            model: GeneratorModel::Poisson,
            seasonal_amplitude: default_seasonal_amplitude(),
            premium_noise_sd: default_premium_noise_sd(),
            trend: default_trend(),
            volume_noise: default_volume_noise(),
            sources: default_sources(),
        }
    }
}

impl GeneratorConfig {
    /// Load from a JSON file.
    /// In tests, use GeneratorConfig::default().
    pub fn load(path: impl AsRef<Path>) -> DashResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DashError::InvalidConfig(format!("Cannot read {}: {e}", path.display()))
        })?;
        let config: GeneratorConfig = serde_json::from_str(&content)?;
        config.validate()?;
        log::debug!(
            "loaded generator config from {}: {} sources, {}..{}",
            path.display(),
            config.sources.len(),
            config.start,
            config.end
        );
        Ok(config)
    }

    pub fn range(&self) -> DateRange {
        DateRange::new(self.start, self.end)
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name.clone()).collect()
    }

    pub fn validate(&self) -> DashResult<()> {
        if self.end < self.start {
            return Err(DashError::InvalidConfig(format!(
                "end {} precedes start {}",
                self.end, self.start
            )));
        }
        if self.sources.is_empty() {
            return Err(DashError::InvalidConfig("no lead sources configured".into()));
        }
        let mut seen = HashSet::new();
        for s in &self.sources {
            if s.name.trim().is_empty() {
                return Err(DashError::InvalidConfig("source with empty name".into()));
            }
            // Exports are read back with fields trimmed.
            if s.name.trim() != s.name {
                return Err(DashError::InvalidConfig(format!(
                    "source '{}': name has surrounding whitespace",
                    s.name
                )));
            }
            if !seen.insert(s.name.as_str()) {
                return Err(DashError::InvalidConfig(format!("duplicate source '{}'", s.name)));
            }
            if !(0.0..=1.0).contains(&s.sales_rate) {
                return Err(DashError::InvalidConfig(format!(
                    "source '{}': sales_rate {} outside [0, 1]",
                    s.name, s.sales_rate
                )));
            }
            if s.leads_base < 0.0 || s.psl_base < 0.0 {
                return Err(DashError::InvalidConfig(format!(
                    "source '{}': negative base parameter",
                    s.name
                )));
            }
        }
        if self.premium_noise_sd < 0.0 || self.volume_noise < 0.0 {
            return Err(DashError::InvalidConfig("negative noise parameter".into()));
        }
        Ok(())
    }
}

/// The twelve channels shipped in data/sources.json.
pub fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::new("Barrington",   120.0, 280.0, 0.18),
        SourceConfig::new("Channel Edge",  80.0, 220.0, 0.14),
        SourceConfig::new("Google",       300.0, 195.0, 0.22),
        SourceConfig::new("Lucent",        60.0, 310.0, 0.16),
        SourceConfig::new("O2C",          200.0, 260.0, 0.20),
        SourceConfig::new("Other",         50.0, 150.0, 0.10),
        SourceConfig::new("Policy Chat",   90.0, 175.0, 0.12),
        SourceConfig::new("Ring 2",        75.0, 240.0, 0.17),
        SourceConfig::new("Roku",         110.0, 205.0, 0.15),
        SourceConfig::new("VOXR",          65.0, 290.0, 0.19),
        SourceConfig::new("Youtube",      180.0, 185.0, 0.13),
        SourceConfig::new("Regal",         95.0, 255.0, 0.21),
    ]
}
