//! CLI entry point for the ETL audit pipeline.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use etl_audit::{Pipeline, PipelineConfig, PipelineConfigBuilder, ReportFormat, RunOutcome, RunSummary};
use std::path::PathBuf;
use tracing::{error, info};

/// CLI-compatible report format enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliReportFormat {
    /// Word document
    Docx,
    /// Report blocks as pretty-printed JSON
    Json,
}

impl From<CliReportFormat> for ReportFormat {
    fn from(cli: CliReportFormat) -> Self {
        match cli {
            CliReportFormat::Docx => ReportFormat::Docx,
            CliReportFormat::Json => ReportFormat::Json,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "One-shot ETL and data-quality audit for delimited datasets",
    long_about = "Loads a delimited dataset, audits missing values, duplicates and \
                  relational inconsistencies, derives KPIs, cleans the data and writes \
                  a cleaned CSV, a text log and a structured report.\n\n\
                  EXAMPLES:\n  \
                  # Run with built-in defaults in the current directory\n  \
                  etl-audit\n\n  \
                  # Audit a specific file and write outputs elsewhere\n  \
                  etl-audit -i data/orders.csv -o out/orders_clean.csv --report out/report.docx\n\n  \
                  # Comma-separated input with dot decimals and a JSON report\n  \
                  etl-audit -i orders.csv --delimiter , --decimal . --report-format json"
)]
struct Args {
    /// JSON configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the delimited input file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Path of the cleaned CSV output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path of the plain-text audit log
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Path of the structured report
    #[arg(long)]
    report: Option<PathBuf>,

    /// Format of the structured report
    #[arg(long, value_enum)]
    report_format: Option<CliReportFormat>,

    /// Field separator of the input file
    #[arg(long)]
    delimiter: Option<char>,

    /// Decimal separator of the input file ('.' or ',')
    #[arg(long)]
    decimal: Option<char>,

    /// Maximum rows shown per report table (0 shows every row)
    #[arg(long)]
    max_table_rows: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,

    /// Print the run summary as JSON to stdout instead of logs
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
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

/// Build the run configuration: defaults, then the config file, then flags.
fn build_config(args: &Args) -> Result<PipelineConfig> {
    let base = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    let mut builder = PipelineConfigBuilder::from_config(base);
    if let Some(ref input) = args.input {
        builder = builder.input_path(input);
    }
    if let Some(ref output) = args.output {
        builder = builder.clean_output_path(output);
    }
    if let Some(ref log_file) = args.log_file {
        builder = builder.text_log_path(log_file);
    }
    if let Some(ref report) = args.report {
        builder = builder.report_path(report);
    }
    if let Some(format) = args.report_format {
        builder = builder.report_format(format.into());
    }
    if let Some(delimiter) = args.delimiter {
        builder = builder.delimiter(delimiter);
    }
    if let Some(decimal) = args.decimal {
        builder = builder.decimal_separator(decimal);
    }
    if let Some(rows) = args.max_table_rows {
        builder = builder.max_table_rows(rows);
    }

    Ok(builder.build()?)
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = build_config(&args)?;
    let pipeline = Pipeline::builder().config(config).build()?;

    let outcome = match pipeline.run() {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Pipeline failed: {}", e);
            return Err(anyhow!("Pipeline failed [{}]: {}", e.error_code(), e));
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    match outcome {
        RunOutcome::Completed(summary) => {
            if !args.json && !args.quiet {
                print_human_readable_summary(&summary);
            }
            Ok(())
        }
        RunOutcome::MissingInput(path) => Err(anyhow!("Input file not found: {}", path.display())),
    }
}

/// Print a human-readable summary of the run.
///
/// This is the default output when neither `--json` nor `--quiet` are specified.
fn print_human_readable_summary(summary: &RunSummary) {
    info!("{}", "=".repeat(80));
    info!("AUDIT COMPLETE");
    info!("{}", "=".repeat(80));

    println!();
    println!("  Rows:           {} -> {}", summary.initial_shape.0, summary.final_shape.0);
    println!("  Columns:        {} -> {}", summary.initial_shape.1, summary.final_shape.1);
    println!("  Missing cells:  {}", summary.total_missing());
    println!("  Duplicates:     {} removed", summary.duplicates_removed);
    if let Some(keys) = summary.key_duplicates {
        println!("  Duplicate keys: {}", keys);
    }
    for check in &summary.inconsistencies {
        println!("  {}: {} keys, {} records", check.title, check.keys, check.records);
    }
    for imputation in &summary.imputations {
        println!(
            "  Imputed {} values in '{}' with median {}",
            imputation.filled, imputation.column, imputation.median
        );
    }
    println!();
    println!("  Cleaned data:   {}", summary.clean_output_path.display());
    println!("  Text log:       {}", summary.text_log_path.display());
    println!("  Report:         {}", summary.report_path.display());
    println!("  Duration:       {} ms", summary.duration_ms);
    println!();
}
