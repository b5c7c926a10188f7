//! CLI entry point for the cleaning pipeline.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use lex_cleaning::{CleaningPipeline, PipelineReport, PipelineSpec, Table, Transformer};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name given to the row key column when keys are written back out.
const DEFAULT_KEY_COLUMN: &str = "row_key";

#[derive(Parser, Debug)]
#[command(
    author = "Lex Machina Team",
    version,
    about = "Fit/transform data cleaning for tabular datasets",
    long_about = "Fits a cleaning pipeline on a CSV file and writes the cleaned result.\n\n\
                  EXAMPLES:\n  \
                  # Clean a training set\n  \
                  lex-cleaning -i train.csv -c cleaning.json -o train_clean.csv\n\n  \
                  # Fit on the training set, apply the learned parameters to a test set\n  \
                  lex-cleaning -i train.csv -c cleaning.json --apply test.csv -o test_clean.csv\n\n  \
                  # Use an explicit row id column\n  \
                  lex-cleaning -i train.csv -c cleaning.json --key-column PassengerId -o out.csv"
)]
struct Args {
    /// Path to the CSV file the pipeline is fit on
    #[arg(short, long)]
    input: PathBuf,

    /// Path to the JSON pipeline description
    #[arg(short, long)]
    config: PathBuf,

    /// Transform this CSV with the parameters fit on --input
    ///
    /// If not specified, the fit table itself is transformed
    #[arg(short, long)]
    apply: Option<PathBuf>,

    /// Path of the cleaned CSV to write
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Integer column holding row identity
    ///
    /// If not specified, rows are keyed by position and no key column is
    /// written
    #[arg(short, long)]
    key_column: Option<String>,

    /// Write row keys as a leading `row_key` column when no --key-column is given
    #[arg(long)]
    write_keys: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,

    /// Print the run summary as JSON to stdout instead of logging it
    #[arg(long)]
    json: bool,
}

/// Run summary printed with `--json`.
#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    input: &'a Path,
    applied_to: Option<&'a Path>,
    rows_before: usize,
    columns_before: usize,
    rows_after: usize,
    columns_after: usize,
    fit: &'a PipelineReport,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is disabled so that stdout only
/// carries the JSON summary.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    for path in std::iter::once(&args.input).chain(args.apply.as_ref()) {
        if !path.exists() {
            return Err(anyhow!("Input file not found: {}", path.display()));
        }
    }

    let spec = PipelineSpec::from_path(&args.config)
        .with_context(|| format!("Failed to load pipeline config {}", args.config.display()))?;
    let mut pipeline = CleaningPipeline::from_spec(&spec)?;
    info!("Loaded pipeline with {} steps", pipeline.len());

    let train = load_table(&args.input, args.key_column.as_deref())?;
    info!(
        "Fit table loaded: {} rows x {} columns",
        train.height(),
        train.width()
    );

    let (fitted_output, report) = pipeline.fit_transform_with_report(&train)?;

    let (source, output) = match &args.apply {
        Some(path) => {
            let table = load_table(path, args.key_column.as_deref())?;
            info!("Applying fitted pipeline to {}", path.display());
            let output = pipeline.transform(&table)?;
            (table, output)
        }
        None => (train, fitted_output),
    };

    if let Some(path) = &args.output {
        let key_column = match (&args.key_column, args.write_keys) {
            (Some(column), _) => Some(column.as_str()),
            (None, true) => Some(DEFAULT_KEY_COLUMN),
            (None, false) => None,
        };
        write_table(&output, path, key_column)?;
        info!("Cleaned data written to {}", path.display());
    }

    if args.json {
        let summary = RunSummary {
            input: &args.input,
            applied_to: args.apply.as_deref(),
            rows_before: source.height(),
            columns_before: source.width(),
            rows_after: output.height(),
            columns_after: output.width(),
            fit: &report,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!(
            "Done: {} rows x {} columns -> {} rows x {} columns",
            source.height(),
            source.width(),
            output.height(),
            output.width()
        );
        let dropped = report.dropped_columns();
        if !dropped.is_empty() {
            info!("Dropped columns: {:?}", dropped);
        }
    }

    Ok(())
}

fn load_table(path: &Path, key_column: Option<&str>) -> Result<Table> {
    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .with_context(|| format!("Failed to read CSV {}", path.display()))?;
    debug!("Loaded {}: {:?}", path.display(), df.shape());

    let table = match key_column {
        Some(column) => Table::from_key_column(df, column)?,
        None => Table::new(df),
    };
    Ok(table)
}

fn write_table(table: &Table, path: &Path, key_column: Option<&str>) -> Result<()> {
    let mut df = match key_column {
        Some(column) => table.to_frame_with_keys(column)?,
        None => table.frame().clone(),
    };
    debug!("Writing {} rows x {} columns", df.height(), df.width());

    let mut file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;
    Ok(())
}
