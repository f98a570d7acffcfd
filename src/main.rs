// Command-line front end: load a CSV export, normalize it, and print or
// export KPI tables and trend series.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use design_kpi::config::PipelineConfig;
use design_kpi::util::{format_int, format_percent};
use design_kpi::{
    loader, output, records_to_table, reports, Kpi, KpiError, RecordFilter, ReportContext,
    SeriesFilter, TrendRange,
};

#[derive(Parser)]
#[command(name = "design-kpi", version, about = "Design-task KPIs from a spreadsheet export")]
struct Cli {
    /// Pipeline configuration (layout and holidays), TOML
    #[arg(short, long, env = "DESIGN_KPI_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Extra holiday list, one Jalali or Gregorian date per line
    #[arg(long, global = true)]
    holidays: Option<PathBuf>,

    /// Fail when the export does not match the configured layout
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize the export and write canonical records as CSV
    Normalize {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Team (and optionally per-designer) KPI table
    Kpis {
        input: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
        /// Add one block of KPIs per designer
        #[arg(long)]
        by_designer: bool,
        /// Export the full table as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write summary statistics as JSON
        #[arg(long)]
        summary: Option<PathBuf>,
    },
    /// KPI trend series
    Trend {
        input: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, default_value = "late")]
        kpi: Kpi,
        /// daily-30, monthly-12 or monthly-all
        #[arg(long, default_value = "monthly-12")]
        range: TrendRange,
        /// Series to draw; "Team" means no designer filter
        #[arg(long = "series", default_value = "Team")]
        series: Vec<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Clone)]
struct FilterArgs {
    #[arg(long = "designer")]
    designers: Vec<String>,
    #[arg(long = "customer")]
    customers: Vec<String>,
    /// First submission date to include (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last submission date to include (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,
}

impl From<FilterArgs> for RecordFilter {
    fn from(args: FilterArgs) -> Self {
        RecordFilter {
            designers: args.designers,
            customers: args.customers,
            from: args.from,
            to: args.to,
        }
    }
}

/// Load config, holidays and the export, and build the report context.
fn load_context(cli: &Cli, input: &Path) -> Result<ReportContext> {
    let config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    let mut holidays = config.holiday_set()?;
    if let Some(path) = &cli.holidays {
        let extra = loader::load_holidays(path)
            .with_context(|| format!("reading holidays {}", path.display()))?;
        holidays.extend(extra.iter().copied());
    }

    let table = loader::load_table(input)
        .with_context(|| format!("reading export {}", input.display()))?;
    if cli.strict {
        config.layout.check(&table.headers)?;
    }
    let (ctx, normalized) = ReportContext::ingest(&table, &config.layout, holidays);
    if !normalized.issues.is_empty() {
        println!(
            "Note: {} layout mismatch(es) against '{}'; affected fields are empty.",
            normalized.issues.len(),
            config.layout.version
        );
    }
    let report = &normalized.report;
    println!(
        "Processing export... ({} rows, {} unparsable cells, {} unmapped labels)",
        format_int(report.total_rows),
        format_int(report.parse_failures.values().sum::<usize>()),
        format_int(report.unmapped.values().sum::<usize>())
    );
    Ok(ctx)
}

fn run_kpis(
    ctx: &ReportContext,
    filter: &RecordFilter,
    by_designer: bool,
    csv_out: Option<&PathBuf>,
    json_out: Option<&PathBuf>,
) -> Result<()> {
    let selected = ctx.select(filter);
    let rows = match reports::generate_kpi_report(&selected, ctx.holidays(), by_designer) {
        Ok(rows) => rows,
        Err(KpiError::EmptyResultSet) => {
            println!("No data: no tasks match the current filters.\n");
            return Ok(());
        }
    };
    println!("Task KPIs ({} tasks)\n", format_int(selected.len()));
    output::preview_table_rows(&rows, rows.len());
    if let Some(path) = csv_out {
        output::write_csv(path, &rows)?;
        println!("(Full table exported to {})\n", path.display());
    }
    if let Some(path) = json_out {
        let stats = reports::generate_summary(&selected, ctx.holidays());
        output::write_json(path, &stats)?;
        println!(
            "Summary: late {}, designer errors {} (written to {})\n",
            stats.late_ratio.map_or_else(|| "n/a".into(), format_percent),
            stats
                .designer_error_ratio
                .map_or_else(|| "n/a".into(), format_percent),
            path.display()
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Normalize { input, output } => {
            let ctx = load_context(&cli, input)?;
            output::write_table(output, &records_to_table(ctx.records()))?;
            println!("Canonical records exported to {}", output.display());
        }
        Commands::Kpis {
            input,
            filter,
            by_designer,
            output,
            summary,
        } => {
            let ctx = load_context(&cli, input)?;
            let filter = RecordFilter::from(filter.clone());
            run_kpis(&ctx, &filter, *by_designer, output.as_ref(), summary.as_ref())?;
        }
        Commands::Trend {
            input,
            filter,
            kpi,
            range,
            series,
            output,
        } => {
            let ctx = load_context(&cli, input)?;
            let series: Vec<SeriesFilter> =
                series.iter().map(|s| SeriesFilter::from_label(s)).collect();
            let trend = ctx.trend(&RecordFilter::from(filter.clone()), *kpi, *range, &series);
            if trend.is_empty() {
                println!("No data: no submissions fall inside the {range} window.\n");
                return Ok(());
            }
            let rows = reports::trend_rows(&trend);
            println!("{} trend ({range})\n", kpi.label());
            output::preview_table_rows(&rows, rows.len());
            if let Some(path) = output {
                output::write_csv(path, &rows)?;
                println!("(Full series exported to {})\n", path.display());
            }
        }
    }
    Ok(())
}
