//! Flat-file persistence layer.
//!
//! RULE: Only store.rs touches the filesystem.
//! The generator and pipeline work on in-memory tables; the store
//! writes them to, and reads them back from, the two CSV exports.

use crate::{
    config::{DEFAULT_LEADS_FILE, DEFAULT_SALES_FILE},
    error::{DashError, DashResult},
    generator::GeneratedDataset,
    record::{CombinedRecord, LeadRecord, SalesRecord},
    types::{LeadSource, Period},
};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};

pub const LEAD_COLUMNS: [&str; 3] = ["PERIOD", "LEAD_SOURCE", "LEAD_COUNT"];
pub const SALES_COLUMNS: [&str; 4] = ["PERIOD", "LEAD_SOURCE", "SOURCE_SALES", "SOURCE_PREMIUM"];

/// Largest count accepted in a single row. Sums of any realistic number of
/// such rows stay far below u64::MAX.
pub const MAX_ROW_COUNT: u64 = u32::MAX as u64;

#[derive(Debug, Clone)]
pub struct DataStore {
    leads_path: PathBuf,
    sales_path: PathBuf,
}

impl DataStore {
    /// A store using the default file names inside `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            leads_path: dir.join(DEFAULT_LEADS_FILE),
            sales_path: dir.join(DEFAULT_SALES_FILE),
        }
    }

    pub fn with_paths(leads: impl Into<PathBuf>, sales: impl Into<PathBuf>) -> Self {
        Self {
            leads_path: leads.into(),
            sales_path: sales.into(),
        }
    }

    pub fn leads_path(&self) -> &Path {
        &self.leads_path
    }

    pub fn sales_path(&self) -> &Path {
        &self.sales_path
    }

    // ── Export ─────────────────────────────────────────────────

    pub fn write_leads(&self, rows: &[LeadRecord]) -> DashResult<()> {
        write_table(&self.leads_path, &LEAD_COLUMNS, rows)
    }

    pub fn write_sales(&self, rows: &[SalesRecord]) -> DashResult<()> {
        write_table(&self.sales_path, &SALES_COLUMNS, rows)
    }

    pub fn export(&self, dataset: &GeneratedDataset) -> DashResult<()> {
        self.write_leads(&dataset.leads)?;
        self.write_sales(&dataset.sales)?;
        log::info!(
            "exported {} lead rows to {} and {} sales rows to {}",
            dataset.leads.len(),
            self.leads_path.display(),
            dataset.sales.len(),
            self.sales_path.display()
        );
        Ok(())
    }

    /// Split a combined table back into the two raw exports.
    pub fn export_combined(&self, rows: &[CombinedRecord]) -> DashResult<()> {
        self.export(&GeneratedDataset {
            leads: rows.iter().map(CombinedRecord::lead_part).collect(),
            sales: rows.iter().map(CombinedRecord::sales_part).collect(),
        })
    }

    // ── Load ───────────────────────────────────────────────────

    pub fn read_leads(&self) -> DashResult<Vec<LeadRecord>> {
        read_table(&self.leads_path, &LEAD_COLUMNS, |r: &LeadRecord| {
            check_count("LEAD_COUNT", r.lead_count)
        })
    }

    pub fn read_sales(&self) -> DashResult<Vec<SalesRecord>> {
        read_table(&self.sales_path, &SALES_COLUMNS, |r: &SalesRecord| {
            check_count("SOURCE_SALES", r.sales)?;
            if !r.premium.is_finite() || r.premium < 0.0 {
                return Err(format!("SOURCE_PREMIUM {} is not a non-negative amount", r.premium));
            }
            Ok(())
        })
    }

    /// Read both exports and outer-join them.
    /// Either file missing or unparsable is DataUnavailable.
    pub fn load_combined(&self) -> DashResult<Vec<CombinedRecord>> {
        let leads = self.read_leads()?;
        let sales = self.read_sales()?;
        let combined = outer_join(&leads, &sales);
        log::info!(
            "loaded {} lead rows and {} sales rows into {} combined rows",
            leads.len(),
            sales.len(),
            combined.len()
        );
        Ok(combined)
    }
}

/// Full outer join on (period, lead_source). Absent counterparts are zero.
///
/// Each key appears exactly once in the result, ordered by (period, source).
/// Duplicate keys within one input are summed.
pub fn outer_join(leads: &[LeadRecord], sales: &[SalesRecord]) -> Vec<CombinedRecord> {
    let mut joined: BTreeMap<(Period, LeadSource), CombinedRecord> = BTreeMap::new();
    let mut duplicate_leads = 0usize;
    let mut duplicate_sales = 0usize;
    let mut lead_keys = HashSet::new();
    let mut sales_keys = HashSet::new();

    for l in leads {
        if !lead_keys.insert((l.period, l.lead_source.as_str())) {
            duplicate_leads += 1;
        }
        let row = entry(&mut joined, l.period, &l.lead_source);
        row.lead_count = row.lead_count.saturating_add(l.lead_count);
    }
    for s in sales {
        if !sales_keys.insert((s.period, s.lead_source.as_str())) {
            duplicate_sales += 1;
        }
        let row = entry(&mut joined, s.period, &s.lead_source);
        row.sales = row.sales.saturating_add(s.sales);
        row.premium += s.premium;
    }

    if duplicate_leads > 0 || duplicate_sales > 0 {
        log::warn!(
            "outer join summed duplicate keys: {duplicate_leads} in leads, {duplicate_sales} in sales"
        );
    }
    joined.into_values().collect()
}

fn entry<'a>(
    joined: &'a mut BTreeMap<(Period, LeadSource), CombinedRecord>,
    period: Period,
    source: &str,
) -> &'a mut CombinedRecord {
    joined
        .entry((period, source.to_string()))
        .or_insert_with(|| CombinedRecord {
            period,
            lead_source: source.to_string(),
            lead_count: 0,
            sales: 0,
            premium: 0.0,
        })
}

fn write_table<T: Serialize>(path: &Path, columns: &[&str], rows: &[T]) -> DashResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    // Written by hand so a header exists even for an empty table.
    writer.write_record(columns)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    log::debug!("wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

fn check_count(column: &str, value: u64) -> Result<(), String> {
    if value > MAX_ROW_COUNT {
        return Err(format!("{column} {value} exceeds {MAX_ROW_COUNT}"));
    }
    Ok(())
}

fn read_table<T, F>(path: &Path, columns: &[&str], check: F) -> DashResult<Vec<T>>
where
    T: DeserializeOwned,
    F: Fn(&T) -> Result<(), String>,
{
    let file = File::open(path).map_err(|e| DashError::unavailable(path, e))?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| DashError::unavailable(path, e))?
        .clone();
    for column in columns {
        if !headers.iter().any(|h| h == *column) {
            return Err(DashError::unavailable(path, format!("missing column {column}")));
        }
    }

    let mut rows = Vec::new();
    for (i, result) in reader.deserialize().enumerate() {
        // Row 1 is the header.
        let row: T =
            result.map_err(|e| DashError::unavailable(path, format!("row {}: {e}", i + 2)))?;
        check(&row).map_err(|e| DashError::unavailable(path, format!("row {}: {e}", i + 2)))?;
        rows.push(row);
    }
    log::debug!("read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> Period {
        NaiveDate::from_ymd_opt(2023, 1, day).unwrap()
    }

    #[test]
    fn outer_join_fills_missing_sides_with_zero() {
        let leads = vec![LeadRecord { period: d(1), lead_source: "Google".into(), lead_count: 5 }];
        let sales = vec![SalesRecord {
            period: d(2),
            lead_source: "Google".into(),
            sales: 1,
            premium: 200.0,
        }];
        let joined = outer_join(&leads, &sales);
        assert_eq!(joined.len(), 2);
        assert_eq!((joined[0].lead_count, joined[0].sales, joined[0].premium), (5, 0, 0.0));
        assert_eq!((joined[1].lead_count, joined[1].sales, joined[1].premium), (0, 1, 200.0));
    }

    #[test]
    fn outer_join_sums_duplicate_keys() {
        let leads = vec![
            LeadRecord { period: d(1), lead_source: "Roku".into(), lead_count: 2 },
            LeadRecord { period: d(1), lead_source: "Roku".into(), lead_count: 3 },
        ];
        let joined = outer_join(&leads, &[]);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].lead_count, 5);
    }
}
