//! Integration tests for the ETL audit pipeline.
//!
//! These tests run the pipeline end to end on the CSV fixtures and inspect
//! the cleaned dataset, the text log and the structured report.

use etl_audit::{
    LoadOptions, Pipeline, PipelineConfig, PipelineConfigBuilder, ReportFormat, RunOutcome,
    RunSummary, detect_inconsistencies, load_table,
};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Default configuration pointed at a fixture, with every output in `out_dir`.
fn config_for(fixture: &str, out_dir: &Path, format: ReportFormat) -> PipelineConfig {
    let extension = match format {
        ReportFormat::Docx => "docx",
        ReportFormat::Json => "json",
    };
    PipelineConfig::builder()
        .input_path(fixtures_path().join(fixture))
        .clean_output_path(out_dir.join("clean.csv"))
        .text_log_path(out_dir.join("audit_log.txt"))
        .report_path(out_dir.join(format!("report.{}", extension)))
        .report_format(format)
        .build()
        .unwrap()
}

fn run(config: PipelineConfig) -> RunOutcome {
    Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run()
        .unwrap()
}

fn completed(outcome: RunOutcome) -> RunSummary {
    match outcome {
        RunOutcome::Completed(summary) => summary,
        RunOutcome::MissingInput(path) => panic!("unexpected missing input: {}", path.display()),
    }
}

fn read_clean_csv(path: &Path) -> DataFrame {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .expect("Failed to create CSV reader")
        .finish()
        .expect("Failed to read CSV file")
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}

// ============================================================================
// Full Pipeline Tests
// ============================================================================

#[test]
fn test_full_run_on_semicolon_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for("orders_semicolon.csv", dir.path(), ReportFormat::Docx);

    let summary = completed(run(config));

    assert_eq!(summary.initial_shape, (8, 12));
    assert_eq!(summary.full_duplicates, 1);
    assert_eq!(summary.key_duplicates, Some(1));
    assert_eq!(summary.duplicates_removed, 1);
    assert_eq!(summary.final_shape, (7, 14));
    assert_eq!(
        summary.derived_columns,
        vec!["Profit_Margin", "Product_Full_Name"]
    );
    assert_eq!(summary.parsed_date_columns, vec!["order_date", "ship_date"]);
    assert_eq!(summary.parse_warnings.len(), 1);
    assert_eq!(summary.parse_warnings[0].column, "order_date");
    assert_eq!(summary.parse_warnings[0].unparseable, 1);

    let missing: Vec<(&str, usize)> = summary
        .missing_values
        .iter()
        .map(|m| (m.column.as_str(), m.missing))
        .collect();
    assert_eq!(missing, vec![("Ship Date", 1), ("Sales", 2), ("Profit", 2)]);

    let imputed: Vec<&str> = summary.imputations.iter().map(|i| i.column.as_str()).collect();
    assert_eq!(imputed, vec!["sales", "profit", "profit_margin"]);
    let sales = &summary.imputations[0];
    assert!((sales.median - 142.165).abs() < 1e-9);
    assert_eq!(sales.filled, 1);

    assert!(dir.path().join("clean.csv").exists());
    assert!(dir.path().join("report.docx").exists());
}

#[test]
fn test_inconsistencies_are_reported_per_check() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for("orders_semicolon.csv", dir.path(), ReportFormat::Json);

    let summary = completed(run(config));

    assert_eq!(summary.inconsistencies.len(), 2);
    let postal = &summary.inconsistencies[0];
    assert_eq!(
        postal.title,
        "Inconsistent Mapping: One Postal Code to Many Cities"
    );
    assert_eq!(postal.keys, 1);
    assert_eq!(postal.records, 2);

    let product = &summary.inconsistencies[1];
    assert_eq!(product.key_column, "Product ID");
    assert_eq!(product.records, 2);
}

#[test]
fn test_cleaned_output_contents() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for("orders_semicolon.csv", dir.path(), ReportFormat::Json);

    completed(run(config));

    let clean = read_clean_csv(&dir.path().join("clean.csv"));
    assert_eq!(clean.height(), 7);
    assert_eq!(
        column_names(&clean),
        vec![
            "row_id",
            "order_id",
            "order_date",
            "ship_date",
            "city",
            "postal_code",
            "product_id",
            "product_name",
            "sales",
            "quantity",
            "discount",
            "profit",
            "profit_margin",
            "product_full_name",
        ]
    );
    for numeric in ["sales", "profit", "profit_margin"] {
        assert_eq!(clean.column(numeric).unwrap().null_count(), 0, "{}", numeric);
    }

    let margins: Vec<f64> = clean
        .column("profit_margin")
        .unwrap()
        .as_materialized_series()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert!(margins.iter().all(|m| m.is_finite()));
    // Row 6 has zero sales
    assert_eq!(margins[5], 0.0);

    let text = fs::read_to_string(dir.path().join("clean.csv")).unwrap();
    assert!(text.contains("FUR-BO-1 | Bush Bookcase"));
}

#[test]
fn test_text_log_layout() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for("orders_semicolon.csv", dir.path(), ReportFormat::Json);

    completed(run(config));

    let log = fs::read_to_string(dir.path().join("audit_log.txt")).unwrap();
    assert!(log.starts_with("DATA ANALYSIS LOG | Generated: "));
    for section in [
        "SECTION: 1. Data Quality Assessment",
        "SECTION: 2. Logical Inconsistency Check",
        "SECTION: 3. Calculations & KPI Enrichment",
        "SECTION: 4. Data Cleaning & Transformation Log",
        "SECTION: 5. Final Dataset Summary",
    ] {
        assert!(log.contains(section), "missing {}", section);
    }
    for message in [
        "| Initial Shape: 8 rows, 12 columns.",
        "| Fully Duplicated Rows: 1",
        "| Added KPI: Profit_Margin (Profit / Sales)",
        "| Added Attribute: Product_Full_Name",
        "| Standardized column names to lowercase snake_case.",
        "| Dropped 1 duplicate rows.",
        "| Converted 'order_date' to datetime.",
        "| Imputed missing values in 'sales' with median: ",
        "| Final Row Count: 7",
        "| Cleaned dataset exported to: ",
    ] {
        assert!(log.contains(message), "missing {}", message);
    }
}

#[test]
fn test_json_report_structure() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for("orders_semicolon.csv", dir.path(), ReportFormat::Json);

    completed(run(config));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("report.json")).unwrap())
            .unwrap();
    assert_eq!(report["title"], "Technical Data Analysis Report");

    let blocks = report["blocks"].as_array().unwrap();
    let headings: Vec<(&str, u64)> = blocks
        .iter()
        .filter(|b| b["type"] == "heading")
        .map(|b| (b["text"].as_str().unwrap(), b["level"].as_u64().unwrap()))
        .collect();
    assert_eq!(
        headings,
        vec![
            ("1. Data Quality Assessment", 1),
            ("2. Logical Inconsistency Check", 2),
            ("3. Calculations & KPI Enrichment", 1),
            ("4. Data Cleaning & Transformation Log", 1),
            ("5. Final Dataset Summary", 1),
        ]
    );

    let missing_table = blocks
        .iter()
        .find(|b| b["type"] == "table" && b["header"][0] == "column")
        .unwrap();
    assert_eq!(missing_table["rows"].as_array().unwrap().len(), 3);

    let postal_table = blocks
        .iter()
        .find(|b| b["type"] == "table" && b["header"][0] == "Postal Code")
        .unwrap();
    assert_eq!(postal_table["rows"][0][1], "Los Angeles");
    assert_eq!(postal_table["rows"][1][1], "San Francisco");
}

// ============================================================================
// Missing Input Tests
// ============================================================================

#[test]
fn test_missing_input_logs_critical_and_writes_nothing_else() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfigBuilder::from_config(config_for(
        "orders_semicolon.csv",
        dir.path(),
        ReportFormat::Docx,
    ))
    .input_path(dir.path().join("GBP_DataSource_Pr.csv"))
    .build()
    .unwrap();

    let outcome = run(config);

    assert!(matches!(outcome, RunOutcome::MissingInput(ref p) if p.ends_with("GBP_DataSource_Pr.csv")));
    assert!(!dir.path().join("clean.csv").exists());
    assert!(!dir.path().join("report.docx").exists());

    let log = fs::read_to_string(dir.path().join("audit_log.txt")).unwrap();
    assert!(log.contains("CRITICAL"));
    assert!(log.contains("GBP_DataSource_Pr.csv"));
    assert!(!log.contains("SECTION:"));
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_run_from_json_config_with_comma_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let base = PipelineConfig::from_json_file(fixtures_path().join("config_comma.json")).unwrap();
    assert_eq!(base.report_format, ReportFormat::Json);

    let config = PipelineConfigBuilder::from_config(base)
        .input_path(fixtures_path().join("orders_comma.csv"))
        .clean_output_path(dir.path().join("out").join("clean.csv"))
        .text_log_path(dir.path().join("log.txt"))
        .report_path(dir.path().join("report.json"))
        .build()
        .unwrap();

    let summary = completed(run(config));

    assert_eq!(summary.initial_shape, (4, 5));
    assert_eq!(summary.key_duplicates, Some(0));
    assert_eq!(summary.derived_columns, vec!["Margin"]);
    assert_eq!(
        summary.inconsistencies[0].title,
        "Inconsistent Mapping: One Postal Code to Many City"
    );
    assert_eq!(summary.inconsistencies[0].records, 2);
    assert!(summary.imputations.iter().any(|i| i.column == "sales" && i.median == 50.0));
    assert!(dir.path().join("out").join("clean.csv").exists());
}

// ============================================================================
// Library API Tests
// ============================================================================

#[test]
fn test_detect_inconsistencies_on_loaded_fixture() {
    let config = config_for(
        "orders_semicolon.csv",
        Path::new("unused"),
        ReportFormat::Docx,
    );
    let df = load_table(&LoadOptions::from_config(&config)).unwrap();

    let violations = detect_inconsistencies(&df, "Product ID", &["Product Name"]).unwrap();

    assert_eq!(violations.height(), 2);
    assert_eq!(
        column_names(&violations),
        vec!["Product ID", "Product Name"]
    );
}
