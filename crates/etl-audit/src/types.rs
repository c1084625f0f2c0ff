use serde::Serialize;
use std::path::PathBuf;

/// Missing-value count for a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingValueCount {
    pub column: String,
    pub missing: usize,
}

/// Outcome of one relational consistency check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InconsistencyCount {
    pub title: String,
    pub key_column: String,
    pub dependent_columns: Vec<String>,
    /// Distinct (key, dependent...) tuples in violation.
    pub records: usize,
    /// Distinct key values mapping to more than one dependent value.
    pub keys: usize,
}

/// A median fill applied to a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Imputation {
    pub column: String,
    pub median: f64,
    pub filled: usize,
}

/// Values that could not be parsed while converting a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseWarning {
    pub column: String,
    pub unparseable: usize,
}

// ============================================================================
// Run Summary
// ============================================================================

/// What a completed run did, in stage order.
///
/// Returned by [`crate::Pipeline::run`] and printed by the binary under `--json`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// (rows, columns) as loaded.
    pub initial_shape: (usize, usize),
    /// (rows, columns) of the cleaned table.
    pub final_shape: (usize, usize),

    pub missing_values: Vec<MissingValueCount>,
    pub full_duplicates: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_duplicates: Option<usize>,

    pub inconsistencies: Vec<InconsistencyCount>,
    pub derived_columns: Vec<String>,

    pub duplicates_removed: usize,
    pub parsed_date_columns: Vec<String>,
    pub parse_warnings: Vec<ParseWarning>,
    pub coerced_numeric_columns: Vec<String>,
    pub imputations: Vec<Imputation>,

    pub clean_output_path: PathBuf,
    pub text_log_path: PathBuf,
    pub report_path: PathBuf,
    pub duration_ms: u64,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total missing cells found at load time.
    pub fn total_missing(&self) -> usize {
        self.missing_values.iter().map(|m| m.missing).sum()
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every stage ran and all outputs were written.
    Completed(RunSummary),
    /// The input file was absent; only the text log was written.
    MissingInput(PathBuf),
}
