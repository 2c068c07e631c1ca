//! leadboard: headless generator and report runner for the lead dashboard.
//!
//! Usage:
//!   leadboard generate --seed 42 --out-dir ./data/out
//!   leadboard report --data-dir ./data/out --granularity weekly --source Google --source Roku
//!   leadboard report --data-dir ./data/out --json

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use leadboard_core::{
    config::{GeneratorConfig, GeneratorModel},
    generator::SyntheticGenerator,
    session::{DashboardSession, DashboardView},
    store::DataStore,
    summary::{SortColumn, SortOrder},
    types::{parse_period, Granularity, Period},
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "leadboard")]
#[command(about = "Synthetic lead/sales data and dashboard reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate synthetic leads and sales and write both CSV exports
    Generate {
        /// Generator config JSON (defaults to the built-in twelve sources)
        #[arg(short, long, env = "LEADBOARD_CONFIG")]
        config: Option<PathBuf>,
        /// Master seed, overrides the config
        #[arg(long)]
        seed: Option<u64>,
        /// First day to generate (YYYY-MM-DD), overrides the config
        #[arg(long, value_parser = period_arg)]
        start: Option<Period>,
        /// Last day to generate (YYYY-MM-DD), overrides the config
        #[arg(long, value_parser = period_arg)]
        end: Option<Period>,
        /// Lead volume model: poisson | trend
        #[arg(long)]
        model: Option<GeneratorModel>,
        /// Directory receiving leads_data.csv and sales_data.csv
        #[arg(short, long, env = "LEADBOARD_DATA_DIR", default_value = ".")]
        out_dir: PathBuf,
    },
    /// Load the CSV exports, aggregate, and print the dashboard
    Report {
        /// Directory holding leads_data.csv and sales_data.csv
        #[arg(short, long, env = "LEADBOARD_DATA_DIR", default_value = ".")]
        data_dir: PathBuf,
        /// Range start (YYYY-MM-DD), defaults to the earliest period
        #[arg(long, value_parser = period_arg)]
        start: Option<Period>,
        /// Range end (YYYY-MM-DD), defaults to the latest period
        #[arg(long, value_parser = period_arg)]
        end: Option<Period>,
        /// daily | weekly | monthly
        #[arg(short, long, default_value = "monthly")]
        granularity: Granularity,
        /// Lead source to include; repeat for several. Defaults to all
        #[arg(short, long = "source")]
        sources: Vec<String>,
        /// Table sort column: bucket | source | leads | sales | premium | psl
        #[arg(long, default_value = "bucket")]
        sort: SortColumn,
        /// Sort the table descending
        #[arg(long)]
        desc: bool,
        /// Print the view model as JSON instead of tables
        #[arg(long)]
        json: bool,
    },
}

fn period_arg(raw: &str) -> Result<Period, String> {
    parse_period(raw).map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { config, seed, start, end, model, out_dir } => {
            let mut config = match config {
                Some(path) => GeneratorConfig::load(&path)
                    .with_context(|| format!("loading generator config {}", path.display()))?,
                None => GeneratorConfig::default(),
            };
            if let Some(seed) = seed {
                config.seed = seed;
            }
            if let Some(start) = start {
                config.start = start;
            }
            if let Some(end) = end {
                config.end = end;
            }
            if let Some(model) = model {
                config.model = model;
            }
            run_generate(config, out_dir)
        }
        Commands::Report { data_dir, start, end, granularity, sources, sort, desc, json } => {
            let store = DataStore::open(&data_dir);
            let table = store
                .load_combined()
                .with_context(|| format!("loading dashboard data from {}", data_dir.display()))?;

            let mut session = DashboardSession::new(table);
            if let Some(full) = session.full_range() {
                session.set_range(start.unwrap_or(full.start), end.unwrap_or(full.end));
            }
            session.set_granularity(granularity);
            session.set_sort(sort, if desc { SortOrder::Descending } else { SortOrder::Ascending });
            if !sources.is_empty() {
                session.selection_mut().set(&sources);
            }

            let view = session.render();
            log::info!(
                "report: {} source rows, {} {} buckets",
                view.by_source.len(),
                view.totals.len(),
                view.granularity
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_report(&view);
            }
            Ok(())
        }
    }
}

fn run_generate(config: GeneratorConfig, out_dir: PathBuf) -> Result<()> {
    println!("Lead dashboard: generator");
    println!("  seed:      {}", config.seed);
    println!("  range:     {}..{}", config.start, config.end);
    println!("  sources:   {}", config.sources.len());
    println!("  out_dir:   {}", out_dir.display());
    println!();

    let generator = SyntheticGenerator::new(config)?;
    let dataset = generator.generate();
    let store = DataStore::open(&out_dir);
    store.export(&dataset)?;

    println!("  model:     {}", generator.model_name());
    println!("  {} -> {} rows", store.leads_path().display(), dataset.leads.len());
    println!("  {} -> {} rows", store.sales_path().display(), dataset.sales.len());
    println!();
    println!("=== SAMPLE ===");
    for (l, s) in dataset.leads.iter().zip(&dataset.sales).take(5) {
        println!(
            "  {} | {:<13} | leads {:>3} | sales {:>2} | premium ${:>9.2}",
            l.period, l.lead_source, l.lead_count, s.sales, s.premium
        );
    }
    Ok(())
}

fn print_report(view: &DashboardView) {
    let s = &view.summary;
    println!("=== SUMMARY ({}..{}, {}) ===", view.range.start, view.range.end, view.granularity);
    println!("  sources:        {}", view.selected_sources.join(", "));
    println!("  buckets:        {}", s.bucket_count);
    println!("  leads:          {}", s.total_leads);
    println!("  sales:          {}", s.total_sales);
    println!("  premium:        ${:.2}", s.total_premium);
    println!("  PSL:            ${:.2}", s.psl);
    println!("  close rate:     {:.1}%", s.close_rate * 100.0);

    println!();
    println!("=== BY SOURCE ===");
    if view.breakdown.is_empty() {
        println!("  (No sources selected)");
    }
    for b in &view.breakdown {
        println!(
            "  {:<13} {:<8} | Leads: {:>7} ({:>5.1}%) | Sales: {:>6} | Premium: ${:>12.2} | PSL: ${:>7.2}",
            b.lead_source,
            view.colors.get(&b.lead_source).map(String::as_str).unwrap_or("-"),
            b.lead_count,
            b.lead_share * 100.0,
            b.sales,
            b.premium,
            b.psl
        );
    }

    println!();
    println!("=== TOTALS ===");
    for t in &view.totals {
        println!(
            "  {} | Leads: {:>6} | Sales: {:>5} | Premium: ${:>11.2} | PSL: ${:>7.2}",
            t.bucket, t.lead_count, t.sales, t.premium, t.psl
        );
    }

    println!();
    println!("=== TABLE ===");
    for r in &view.by_source {
        println!(
            "  {} | {:<13} | Leads: {:>6} | Sales: {:>5} | Premium: ${:>11.2} | PSL: ${:>7.2}",
            r.bucket, r.lead_source, r.lead_count, r.sales, r.premium, r.psl
        );
    }
}
