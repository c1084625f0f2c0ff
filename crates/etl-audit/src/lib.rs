//! ETL and Data-Quality Audit Library
//!
//! A one-shot batch audit of a delimited tabular dataset, built with Rust and Polars.
//!
//! # Overview
//!
//! A run performs, in order:
//!
//! - **Loading**: delimited text with a configurable field and decimal separator
//! - **Quality Assessment**: missing values, duplicate rows and duplicate primary keys
//! - **Inconsistency Detection**: keys that map to more than one dependent value
//! - **Enrichment**: derived KPI and attribute columns
//! - **Cleaning**: snake_case column names, deduplication, date parsing and
//!   median imputation of numeric columns
//! - **Reporting**: a timestamped text log and a structured report (Word or JSON)
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use etl_audit::{Pipeline, PipelineConfig, RunOutcome};
//!
//! let config = PipelineConfig::builder()
//!     .input_path("data/orders.csv")
//!     .clean_output_path("out/orders_clean.csv")
//!     .build()?;
//!
//! match Pipeline::builder().config(config).build()?.run()? {
//!     RunOutcome::Completed(summary) => {
//!         println!("Removed {} duplicate rows", summary.duplicates_removed);
//!     }
//!     RunOutcome::MissingInput(path) => {
//!         eprintln!("{} not found", path.display());
//!     }
//! }
//! ```
//!
//! # Inconsistency Detection
//!
//! The detector can also be used on its own:
//!
//! ```rust,ignore
//! use etl_audit::quality::detect_inconsistencies;
//!
//! let violations = detect_inconsistencies(&df, "Postal Code", &["City"])?;
//! ```

pub mod cleaner;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod quality;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{DataCleaner, normalize_column_name};
pub use config::{
    ConfigValidationError, Derivation, PipelineConfig, PipelineConfigBuilder, RelationalCheck,
    ReportFormat,
};
pub use enrichment::KpiDeriver;
pub use error::{EtlError, Result as EtlResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use loader::{LoadOptions, load_table};
pub use pipeline::{Pipeline, PipelineBuilder, PipelineStage};
pub use quality::{InconsistencyReport, QualityAssessor, detect_inconsistencies};
pub use reporting::{
    AuditReporter, DocumentBlock, DocumentRenderer, DocxRenderer, JsonRenderer, ReportDocument,
    TableBlock, renderer_for,
};
pub use types::{
    Imputation, InconsistencyCount, MissingValueCount, ParseWarning, RunOutcome, RunSummary,
};
