use analytics::{AnalyticsEngine, DateRange, ReportRequest, ReturnsReport};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use configuration::{OutputFormat, Settings};
use core_types::PERIOD_CATALOG;
use rust_decimal::Decimal;
use series_store::{export, load_raw_rows, ExportWindow, Snapshot};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// The main entry point for the Meridian returns engine.
fn main() -> Result<()> {
    // Load environment variables from .env file, if there is one.
    dotenvy::dotenv().ok();

    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .init();

    // Parse command-line arguments
    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => configuration::load_config_from(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => configuration::load_config().context("Failed to load configuration")?,
    };

    // Execute the appropriate command
    match cli.command {
        Commands::Returns(args) => handle_returns(args, &settings),
        Commands::Export(args) => handle_export(args, &settings),
        Commands::Compare(args) => handle_compare(args, &settings),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Periodic returns, CAGR and drawdowns for index and strategy series.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults to `config.toml` in the working
    /// directory; a missing default file falls back to built-in settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute period returns, MDD and current drawdown (plus an optional custom range).
    Returns(ReturnsArgs),
    /// Dump filtered series with an overall "as of" date.
    Export(ExportArgs),
    /// Backfill and rebase series onto a common starting value.
    Compare(CompareArgs),
}

#[derive(Args)]
struct DataArgs {
    /// JSON file of raw rows: {"NAME": [{"date": "YYYY-MM-DD", "value": ...}]}.
    #[arg(long)]
    data: PathBuf,

    /// Restrict to these series (comma separated). Defaults to every series.
    #[arg(long, value_delimiter = ',')]
    series: Vec<String>,
}

impl DataArgs {
    fn series_filter(&self) -> Option<Vec<String>> {
        (!self.series.is_empty()).then(|| self.series.clone())
    }
}

#[derive(Args)]
struct ReturnsArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Evaluate as of this date (format: YYYY-MM-DD).
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Custom range start (format: YYYY-MM-DD).
    #[arg(long, requires = "end")]
    start: Option<NaiveDate>,

    /// Custom range end (format: YYYY-MM-DD).
    #[arg(long, requires = "start")]
    end: Option<NaiveDate>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

#[derive(Args)]
struct ExportArgs {
    #[command(flatten)]
    data: DataArgs,

    #[arg(long)]
    start: Option<NaiveDate>,

    #[arg(long)]
    end: Option<NaiveDate>,
}

#[derive(Args)]
struct CompareArgs {
    #[command(flatten)]
    data: DataArgs,

    #[arg(long)]
    start: NaiveDate,

    #[arg(long)]
    end: NaiveDate,

    /// Value every series starts from. Defaults to `normalizer.rebase_base`.
    #[arg(long)]
    base: Option<Decimal>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn load_snapshot(path: &Path, settings: &Settings) -> Result<Snapshot> {
    let raw = load_raw_rows(path)
        .with_context(|| format!("Failed to load raw series from {}", path.display()))?;
    let snapshot = Snapshot::build(raw, settings);
    tracing::info!(
        series = snapshot.store.len(),
        reference = %settings.calendar.reference_series,
        calendar_fallback = snapshot.calendar.is_fallback(),
        "Snapshot ready."
    );
    Ok(snapshot)
}

fn handle_returns(args: ReturnsArgs, settings: &Settings) -> Result<()> {
    let snapshot = load_snapshot(&args.data.data, settings)?;
    let request = ReportRequest {
        series: args.data.series_filter(),
        as_of: args.as_of,
        custom_range: args.start.zip(args.end).map(|(start, end)| DateRange::new(start, end)),
    };

    let engine = AnalyticsEngine::new(&settings.custom_range);
    let report = engine.calculate(&snapshot, &request);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => println!("{}", render_table(&report, request.custom_range.is_some())),
    }
    Ok(())
}

fn render_table(report: &ReturnsReport, with_custom_range: bool) -> Table {
    let mut header = vec!["Series".to_string()];
    header.extend(PERIOD_CATALOG.iter().map(|def| def.code.to_string()));
    header.extend(["MDD".to_string(), "Drawdown".to_string()]);
    if with_custom_range {
        header.extend(["CDR".to_string(), "CDR_MDD".to_string()]);
    }

    let mut table = Table::new();
    table.set_header(header);

    for (name, series) in &report.series {
        let mut row = vec![name.clone()];
        match series {
            Some(s) => {
                row.extend(PERIOD_CATALOG.iter().map(|def| s.period(def.code).to_string()));
                row.extend([s.mdd().to_string(), s.drawdown().to_string()]);
                if let (Some(cdr), Some(cdr_mdd)) = (s.cdr(), s.cdr_mdd()) {
                    row.extend([cdr.to_string(), cdr_mdd.to_string()]);
                }
            }
            None => row.push("unknown series".to_string()),
        }
        table.add_row(row);
    }
    table
}

fn handle_export(args: ExportArgs, settings: &Settings) -> Result<()> {
    let snapshot = load_snapshot(&args.data.data, settings)?;
    let names = args.data.series_filter();
    let bundle = export(
        &snapshot.store,
        names.as_deref(),
        ExportWindow::new(args.start, args.end),
    );
    println!("{}", serde_json::to_string_pretty(&bundle)?);
    Ok(())
}

fn handle_compare(args: CompareArgs, settings: &Settings) -> Result<()> {
    let snapshot = load_snapshot(&args.data.data, settings)?;
    let base = args.base.unwrap_or(settings.normalizer.rebase_base);
    anyhow::ensure!(base > Decimal::ZERO, "--base must be greater than 0, got {base}");

    let names = args
        .data
        .series_filter()
        .unwrap_or_else(|| snapshot.store.all_series_names().into_iter().collect());
    let series: Vec<_> = names
        .iter()
        .filter_map(|name| {
            let found = snapshot.store.series(name);
            if found.is_none() {
                tracing::warn!(series = %name, "Unknown series; leaving it out of the comparison.");
            }
            found
        })
        .collect();

    let comparison = normalizer::build_comparison(&series, args.start, args.end, base);
    println!("{}", serde_json::to_string_pretty(&comparison)?);
    Ok(())
}
