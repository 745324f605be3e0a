use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use impact_tables_to_csv::options::{
    DEFAULT_ALIGNMENT_TOLERANCE, DEFAULT_HEADER_DEPTH, DEFAULT_HEADER_SEARCH_DISTANCE,
    DEFAULT_HEADER_START_ROW, DEFAULT_MAX_DATA_ROWS, DEFAULT_SNAP_TOLERANCE,
    DEFAULT_TITLE_MAX_CHARS,
};
use impact_tables_to_csv::{
    ClassificationReport, ClassifyOptions, ExtractWarning, FlattenOptions, FlattenReport,
    PageSelection, TableSettings, classify_pdf_to_csv, flatten_workbook_to_csv,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "impact2csv",
    version,
    about = "Flatten disaster-impact spreadsheets and classify location tables in PDF reports"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Flatten a tiered-header spreadsheet into the archive CSV schema.
    Flatten(FlattenArgs),
    /// Classify ruled location tables of a PDF into a hierarchical CSV.
    Classify(ClassifyArgs),
}

#[derive(Debug, Args)]
struct CommonArgs {
    /// Output delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Write the run report as JSON to this path.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log per-row decisions and list every warning.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Args)]
struct FlattenArgs {
    /// Input spreadsheet path (xlsx, xls, xlsb or ods).
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV path.
    #[arg(short, long, default_value = "gda.csv")]
    output: PathBuf,

    /// Worksheet name; defaults to the first sheet.
    #[arg(long)]
    sheet: Option<String>,

    /// 0-based row index of the first header tier.
    #[arg(long, default_value_t = DEFAULT_HEADER_START_ROW)]
    header_start: usize,

    /// Number of header tiers.
    #[arg(long, default_value_t = DEFAULT_HEADER_DEPTH)]
    header_depth: usize,

    /// Maximum number of data rows read after the header.
    #[arg(long, default_value_t = DEFAULT_MAX_DATA_ROWS)]
    max_rows: usize,

    /// Emit mapped columns missing from the sheet as blank instead of failing.
    #[arg(long)]
    allow_missing: bool,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Debug, Args)]
struct ClassifyArgs {
    /// Input PDF path.
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV path.
    #[arg(short, long, default_value = "hierarchical_parsed.csv")]
    output: PathBuf,

    /// Page selection like 1-3,5.
    #[arg(long)]
    pages: Option<String>,

    /// Distance within which parallel rules snap together.
    #[arg(long, default_value_t = DEFAULT_SNAP_TOLERANCE)]
    snap_tolerance: f64,

    /// Margin difference still treated as centred text.
    #[arg(long, default_value_t = DEFAULT_ALIGNMENT_TOLERANCE)]
    alignment_tolerance: f64,

    /// Height of the band above a table searched for its title.
    #[arg(long, default_value_t = DEFAULT_HEADER_SEARCH_DISTANCE)]
    header_search_distance: f64,

    /// Mixed-case lines this long or longer are not accepted as titles.
    #[arg(long, default_value_t = DEFAULT_TITLE_MAX_CHARS)]
    title_max_chars: usize,

    #[command(flatten)]
    common: CommonArgs,
}

fn parse_delimiter(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }
    Ok(delimiter as u8)
}

fn parse_classify_options(args: &ClassifyArgs) -> Result<ClassifyOptions> {
    let pages = args
        .pages
        .as_deref()
        .map(PageSelection::from_str)
        .transpose()
        .map_err(|error| anyhow!("invalid page selection: {error}"))
        .context("failed to parse --pages")?;

    Ok(ClassifyOptions {
        pages,
        delimiter: parse_delimiter(args.common.delimiter)?,
        table: TableSettings {
            snap_tolerance: args.snap_tolerance,
            ..TableSettings::default()
        },
        header_search_distance: args.header_search_distance,
        alignment_tolerance: args.alignment_tolerance,
        title_max_chars: args.title_max_chars,
        ..ClassifyOptions::default()
    })
}

fn parse_flatten_options(args: &FlattenArgs) -> Result<FlattenOptions> {
    Ok(FlattenOptions {
        sheet: args.sheet.clone(),
        header_start: args.header_start,
        header_depth: args.header_depth,
        max_rows: args.max_rows,
        delimiter: parse_delimiter(args.common.delimiter)?,
        allow_missing: args.allow_missing,
    })
}

fn log_warnings(warnings: &[ExtractWarning], verbose: bool) {
    if warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", warnings.len());
    if verbose {
        for warning in warnings {
            eprintln!(
                "  - {:?} page={:?} table_id={:?} row={:?}: {}",
                warning.code, warning.page, warning.table_id, warning.row, warning.message
            );
        }
    }
}

fn write_report<T: Serialize>(path: &Path, report: &T) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create report '{}'", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .with_context(|| format!("failed to write report '{}'", path.display()))
}

fn print_preview(report: &ClassificationReport) {
    if report.preview.is_empty() {
        return;
    }

    println!(
        "{:<24} {:<24} {:<24} {:<24}",
        "Region", "Province", "City_Municipality", "Barangay"
    );
    for hierarchy in &report.preview {
        let [region, province, municipality, barangay] = hierarchy.columns();
        println!("{region:<24} {province:<24} {municipality:<24} {barangay:<24}");
    }
}

fn run_flatten(args: &FlattenArgs) -> Result<FlattenReport> {
    let options = parse_flatten_options(args)?;
    let report = flatten_workbook_to_csv(&args.input, &args.output, &options)
        .with_context(|| format!("failed to flatten '{}'", args.input.display()))?;

    println!(
        "Flattened {} column(s); {} row(s) saved to {}",
        report.column_count,
        report.row_count,
        args.output.display()
    );
    if let Some(path) = &args.common.report {
        write_report(path, &report)?;
    }
    Ok(report)
}

fn run_classify(args: &ClassifyArgs) -> Result<ClassificationReport> {
    let options = parse_classify_options(args)?;
    let report = classify_pdf_to_csv(&args.input, &args.output, &options)
        .with_context(|| format!("failed to classify tables in '{}'", args.input.display()))?;

    println!(
        "Processed {} page(s); {} structured row(s) saved to {}",
        report.page_count,
        report.row_count,
        args.output.display()
    );
    print_preview(&report);
    if let Some(path) = &args.common.report {
        write_report(path, &report)?;
    }
    Ok(report)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("impact_tables_to_csv={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn exit_code(row_count: usize) -> ExitCode {
    if row_count > 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let outcome = match &cli.command {
        Commands::Flatten(args) => {
            init_tracing(args.common.verbose);
            run_flatten(args).map(|report| {
                log_warnings(&report.warnings, args.common.verbose);
                report.row_count
            })
        }
        Commands::Classify(args) => {
            init_tracing(args.common.verbose);
            run_classify(args).map(|report| {
                log_warnings(&report.warnings, args.common.verbose);
                report.row_count
            })
        }
    };

    match outcome {
        Ok(row_count) => exit_code(row_count),
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
